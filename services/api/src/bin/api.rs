//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileKvAdapter, OpenAiChatAdapter, OpenAiGuideAdapter},
    config::Config,
    error::ApiError,
    web::{
        current_session_handler, delete_session_handler, generate_handler, get_theme_handler,
        list_sessions_handler, merge_sessions_handler, new_session_handler, rest::ApiDoc,
        select_session_handler, set_theme_handler, state::AppState, upload_files_handler,
        ws_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use study_vision_core::{controller::SessionController, store::SessionStore};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Local Storage & Restore Sessions ---
    let kv = Arc::new(FileKvAdapter::new(config.data_dir.clone()));
    let store = SessionStore::new(kv);
    let controller = SessionController::init(store.clone()).await;

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let guide_adapter = Arc::new(OpenAiGuideAdapter::new(
        openai_client.clone(),
        config.guide_model.clone(),
    ));
    let chat_adapter = Arc::new(OpenAiChatAdapter::new(
        openai_client.clone(),
        config.chat_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        controller: Mutex::new(controller),
        store,
        guide_adapter,
        chat_adapter,
        config: config.clone(),
        generating: AtomicBool::new(false),
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:5173".parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/sessions", get(list_sessions_handler))
        .route("/sessions/current", get(current_session_handler))
        .route("/sessions/new", post(new_session_handler))
        .route("/sessions/merge", post(merge_sessions_handler))
        .route("/sessions/{id}/select", post(select_session_handler))
        .route("/sessions/{id}", delete(delete_session_handler))
        .route("/files", post(upload_files_handler))
        .route("/generate", post(generate_handler))
        .route("/theme", get(get_theme_handler).put(set_theme_handler))
        .route("/ws", get(ws_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
