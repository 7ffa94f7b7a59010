pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the main handlers to make them easily accessible
// to the binary that will build the web server router.
pub use rest::{
    current_session_handler, delete_session_handler, generate_handler, get_theme_handler,
    list_sessions_handler, merge_sessions_handler, new_session_handler, select_session_handler,
    set_theme_handler, upload_files_handler,
};
pub use ws_handler::ws_handler;
