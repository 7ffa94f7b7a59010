//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use study_vision_core::{
    controller::SessionController,
    ports::{ChatService, StudyGuideGenerator},
    store::SessionStore,
};
use tokio::sync::Mutex;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    /// The single logical writer over the session collection. Handlers lock it
    /// per operation and never hold it across a provider call.
    pub controller: Mutex<SessionController>,
    /// Kept alongside the controller for the theme-preference endpoints.
    pub store: SessionStore,
    pub guide_adapter: Arc<dyn StudyGuideGenerator>,
    pub chat_adapter: Arc<dyn ChatService>,
    pub config: Arc<Config>,
    /// True while a generation request is in flight. A second generation is
    /// rejected until the first settles; everything else stays responsive.
    pub generating: AtomicBool,
}
