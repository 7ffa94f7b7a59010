//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use study_vision_core::{
    controller::title_from_sources,
    domain::{Session, SourceFile, Theme},
};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Mime types the upload endpoint accepts, matching the browser picker.
const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "application/pdf"];

const SKIPPED_FILES_MESSAGE: &str =
    "Some files were skipped. Please upload valid images (JPG, PNG, WEBP) or PDFs.";

const GENERATION_FAILED_MESSAGE: &str = "Failed to generate study guide. Please try again.";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_sessions_handler,
        select_session_handler,
        delete_session_handler,
        new_session_handler,
        merge_sessions_handler,
        upload_files_handler,
        get_theme_handler,
        set_theme_handler,
    ),
    components(
        schemas(SessionSummary, MergeRequest, UploadResponse, ThemeRequest)
    ),
    tags(
        (name = "Study Vision API", description = "API endpoints for the study-guide generator and session history.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A session as listed in the sidebar: identity and title, without the guide.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            title: session.title.clone(),
            created_at: session.created_at,
        }
    }
}

/// The ids of the sessions to merge. Inputs are gathered in sidebar
/// (newest-first) order, not in the order of this list.
#[derive(Deserialize, ToSchema)]
pub struct MergeRequest {
    pub ids: Vec<Uuid>,
}

/// The outcome of one upload request.
#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub accepted: usize,
    pub skipped: usize,
    pub message: Option<String>,
}

/// The theme preference as its storage text, `"light"` or `"dark"`.
#[derive(Deserialize, ToSchema)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub focus_hint: Option<String>,
}

//=========================================================================================
// Session Handlers
//=========================================================================================

/// List all saved sessions, newest first.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "The saved sessions, newest first", body = [SessionSummary])
    )
)]
pub async fn list_sessions_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = app_state.controller.lock().await;
    let summaries: Vec<SessionSummary> =
        controller.sessions().iter().map(SessionSummary::from).collect();
    Json(summaries)
}

/// The full current session, or `null` when the application is idle.
pub async fn current_session_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let controller = app_state.controller.lock().await;
    Json(controller.current_session().cloned())
}

/// Make a session current. Unknown ids are silently ignored.
#[utoipa::path(
    post,
    path = "/sessions/{id}/select",
    responses((status = 204, description = "Selection applied (or no-op for an unknown id)")),
    params(("id" = Uuid, Path, description = "The session to select"))
)]
pub async fn select_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    let mut controller = app_state.controller.lock().await;
    controller.select(id);
    StatusCode::NO_CONTENT
}

/// Delete a session. Deleting the current session returns the app to idle.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses((status = 204, description = "Deletion applied (or no-op for an unknown id)")),
    params(("id" = Uuid, Path, description = "The session to delete"))
)]
pub async fn delete_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    let mut controller = app_state.controller.lock().await;
    controller.delete(id).await;
    StatusCode::NO_CONTENT
}

/// Clear the current session and any pending upload draft ("new chat").
#[utoipa::path(
    post,
    path = "/sessions/new",
    responses((status = 204, description = "Returned to the idle state"))
)]
pub async fn new_session_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    let mut controller = app_state.controller.lock().await;
    controller.new_session();
    StatusCode::NO_CONTENT
}

/// Merge two or more saved sessions into a new one.
#[utoipa::path(
    post,
    path = "/sessions/merge",
    request_body = MergeRequest,
    responses(
        (status = 201, description = "The merged session, now current", body = SessionSummary),
        (status = 400, description = "Fewer than two known sessions were selected")
    )
)]
pub async fn merge_sessions_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<MergeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut controller = app_state.controller.lock().await;
    match controller.merge(&payload.ids).await {
        Some(session) => {
            info!("Merged {} session(s) into '{}'", payload.ids.len(), session.title);
            Ok((StatusCode::CREATED, Json(SessionSummary::from(&session))))
        }
        None => Err((
            StatusCode::BAD_REQUEST,
            "Select at least two sessions to merge".to_string(),
        )),
    }
}

//=========================================================================================
// Upload and Generation Handlers
//=========================================================================================

/// Add notes files to the pending upload draft.
///
/// Accepts a multipart/form-data request; parts with an unsupported content
/// type are skipped and reported, matching the browser behavior.
#[utoipa::path(
    post,
    path = "/files",
    request_body(content_type = "multipart/form-data", description = "The notes files to queue for generation."),
    responses(
        (status = 200, description = "Upload outcome", body = UploadResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_files_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut accepted_files = Vec::new();
    let mut skipped = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let mime_type = field.content_type().unwrap_or("").to_string();
        let file_name = field.file_name().unwrap_or("untitled").to_string();
        if !ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) {
            warn!("Skipping upload '{}' with type '{}'", file_name, mime_type);
            skipped += 1;
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        accepted_files.push(SourceFile {
            bytes,
            mime_type,
            file_name,
        });
    }

    let accepted = accepted_files.len();
    {
        let mut controller = app_state.controller.lock().await;
        for file in accepted_files {
            controller.push_file(file);
        }
    }

    Ok(Json(UploadResponse {
        accepted,
        skipped,
        message: (skipped > 0).then(|| SKIPPED_FILES_MESSAGE.to_string()),
    }))
}

/// Generate a study guide from the pending upload draft.
///
/// Only one generation may be in flight; the provider call happens outside
/// the controller lock so every other endpoint stays responsive. On failure
/// the draft is restored so the user can retry, and no session is stored.
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if app_state
        .generating
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err((
            StatusCode::CONFLICT,
            "A generation request is already in progress".to_string(),
        ));
    }

    let compose = {
        let mut controller = app_state.controller.lock().await;
        if let Some(hint) = payload.focus_hint {
            controller.set_focus_hint(hint);
        }
        controller.take_compose()
    };
    if compose.files.is_empty() {
        app_state.generating.store(false, Ordering::SeqCst);
        return Err((
            StatusCode::BAD_REQUEST,
            "Upload at least one file before generating".to_string(),
        ));
    }

    let result = app_state
        .guide_adapter
        .generate(&compose.files, &compose.focus_hint)
        .await;
    app_state.generating.store(false, Ordering::SeqCst);

    match result {
        Ok(guide) => {
            let title = title_from_sources(&compose.files);
            let mut controller = app_state.controller.lock().await;
            let session = controller.create_from_generation(guide, title).await;
            info!("Generated study guide session '{}'", session.title);
            Ok((StatusCode::CREATED, Json(session)))
        }
        Err(e) => {
            error!("Study guide generation failed: {}", e);
            let mut controller = app_state.controller.lock().await;
            for file in compose.files {
                controller.push_file(file);
            }
            controller.set_focus_hint(compose.focus_hint);
            Err((StatusCode::BAD_GATEWAY, GENERATION_FAILED_MESSAGE.to_string()))
        }
    }
}

//=========================================================================================
// Theme Handlers
//=========================================================================================

/// The persisted theme preference, or `null` when none was saved.
#[utoipa::path(
    get,
    path = "/theme",
    responses((status = 200, description = "The persisted theme preference, if any"))
)]
pub async fn get_theme_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.store.load_theme().await)
}

/// Persist the theme preference.
#[utoipa::path(
    put,
    path = "/theme",
    request_body = ThemeRequest,
    responses(
        (status = 204, description = "Preference saved"),
        (status = 400, description = "Unknown theme value"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn set_theme_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ThemeRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let theme = Theme::parse(&payload.theme).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown theme '{}'", payload.theme),
        )
    })?;
    app_state
        .store
        .save_theme(theme)
        .await
        .map_err(|e| {
            error!("Failed to persist theme preference: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save theme preference".to_string(),
            )
        })?;
    Ok(StatusCode::NO_CONTENT)
}
