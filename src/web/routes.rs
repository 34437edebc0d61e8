use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::web::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/create_server", post(create_server))
        .route("/servers", get(list_servers))
        .route("/console/:server", post(send_command))
        .route("/console/:server/output", get(console_output))
        .route("/start/:server", post(start_server))
        .route("/restart/:server", post(restart_server))
        .route("/stop/:server", post(stop_server))
        .route("/files/:server", get(list_files))
        .route(
            "/files/:server/:filename",
            get(read_file).put(write_file).delete(delete_file),
        )
        .route("/files/:server/upload", post(upload_file))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateServerParams {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommandParams {
    command: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteFileParams {
    #[serde(default)]
    content: String,
}

/// POST /create_server - reset the directory and start a fresh session
#[instrument(skip(state, params))]
async fn create_server(
    State(state): State<AppState>,
    Json(params): Json<CreateServerParams>,
) -> Result<Json<Value>, AppError> {
    let name = params
        .name
        .filter(|n| !n.is_empty())
        .ok_or(AppError::MissingServerName)?;

    state.managers.store.create_or_reset(&name).await?;

    // A stale session from a previous incarnation must not survive a create.
    if state.managers.terminal.exists(&name).await {
        state.managers.terminal.kill(&name).await?;
    }
    state.managers.terminal.create(&name).await?;

    info!(server = %name, "Server created");
    Ok(Json(json!({ "success": true, "server": name })))
}

/// GET /servers - list session names
async fn list_servers(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.managers.store.list().await?))
}

/// POST /console/:server - forward one command line to the session
#[instrument(skip(state, params))]
async fn send_command(
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(params): Json<CommandParams>,
) -> Result<Json<Value>, AppError> {
    let command = params
        .command
        .ok_or_else(|| AppError::InvalidRequest("No command".to_string()))?;

    if !state.managers.terminal.exists(&server).await {
        return Err(AppError::ServerNotRunning);
    }
    state.managers.terminal.send(&server, &command).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /console/:server/output - snapshot of the visible buffer
async fn console_output(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<Value>, AppError> {
    let output = state.managers.terminal.capture(&server).await?;
    Ok(Json(json!({ "output": output })))
}

/// POST /start/:server - create the session if absent (no directory wipe)
async fn start_server(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.managers.terminal.create(&server).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /restart/:server - kill then create
async fn restart_server(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.managers.terminal.kill(&server).await?;
    state.managers.terminal.create(&server).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /stop/:server - kill the session, keep the directory
async fn stop_server(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.managers.terminal.kill(&server).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /files/:server - list filenames
async fn list_files(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.managers.files.list(&server).await?))
}

/// GET /files/:server/:filename - raw file contents, empty 404 when absent
async fn read_file(
    State(state): State<AppState>,
    Path((server, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    match state.managers.files.read(&server, &filename).await? {
        Some(content) => {
            let mime = mime_guess::from_path(&filename)
                .first_or_text_plain()
                .to_string();
            Ok(([(header::CONTENT_TYPE, mime)], content).into_response())
        }
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// PUT /files/:server/:filename - create or overwrite with text content
async fn write_file(
    State(state): State<AppState>,
    Path((server, filename)): Path<(String, String)>,
    Json(params): Json<WriteFileParams>,
) -> Result<Json<Value>, AppError> {
    state
        .managers
        .files
        .write(&server, &filename, &params.content)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /files/:server/:filename - remove, reporting presence
async fn delete_file(
    State(state): State<AppState>,
    Path((server, filename)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    if state.managers.files.delete(&server, &filename).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::FileNotFound)
    }
}

/// POST /files/:server/upload - multipart upload, stored verbatim
#[instrument(skip(state, multipart))]
async fn upload_file(
    State(state): State<AppState>,
    Path(server): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::InvalidRequest("Upload is missing a filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        state.managers.files.upload(&server, &filename, &bytes).await?;
        info!(server = %server, filename = %filename, bytes = bytes.len(), "File uploaded");
        return Ok(Json(json!({ "success": true })));
    }
    Err(AppError::InvalidRequest(
        "Multipart body had no 'file' field".to_string(),
    ))
}
