use crate::error::AppError;
use crate::models::{RecencyEntry, StoredObject};
use crate::services::storage::TEMP_MARKER;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use chrono::Utc;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::StreamReader;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub status: String,
    pub url: String,
    pub folder: String,
    pub filename: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub token: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Multipart, description = "Fields: `folder` (optional, before `file`), `file` (binary)"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file, disallowed type, or bad folder path"),
        (status = 413, description = "File exceeds the size limit")
    )
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut folder = String::new();
    let mut stored: Option<StoredObject> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "folder" && stored.is_none() {
            // Field order matters: a folder field is honored only when it
            // precedes the file field, as in the original client protocol.
            folder = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        } else if name == "file" {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let declared_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let body_with_io_error =
                field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
            let reader = StreamReader::new(body_with_io_error);

            let object = state
                .storage
                .put(reader, &original_name, &declared_type, &folder)
                .await?;

            // Folder-creation uploads leave no object behind and are not
            // activity worth feeding back.
            if original_name != TEMP_MARKER {
                state.recent.record(RecencyEntry {
                    filename: object.filename.clone(),
                    folder: object.folder.clone(),
                    url: object.url.clone(),
                    uploaded_at: Utc::now(),
                });
            }

            stored = Some(object);
        }
    }

    let stored = stored.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

    Ok(Json(UploadResponse {
        status: "success".to_string(),
        url: stored.url,
        folder: stored.folder,
        filename: stored.filename,
    }))
}

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Full inventory, newest first", body = [StoredObject])
    )
)]
pub async fn list_files(State(state): State<crate::AppState>) -> Json<Vec<StoredObject>> {
    Json(state.storage.list().await)
}

#[utoipa::path(
    get,
    path = "/api/recent",
    responses(
        (status = 200, description = "Up to the last 10 uploads, oldest first", body = [RecencyEntry])
    )
)]
pub async fn recent_uploads(State(state): State<crate::AppState>) -> Json<Vec<RecencyEntry>> {
    Json(state.recent.snapshot())
}

#[utoipa::path(
    delete,
    path = "/delete/{filename}",
    params(
        ("filename" = String, Path, description = "Bare root-level filename"),
        ("token" = Option<String>, Query, description = "Shared delete secret")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 403, description = "Missing or invalid token"),
        (status = 404, description = "No such root-level file")
    )
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Path(filename): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>, AppError> {
    match params.token {
        Some(token) if token == state.config.delete_token => {}
        _ => {
            tracing::warn!("Rejected delete of {} with bad token", filename);
            return Err(AppError::Forbidden("Invalid token".to_string()));
        }
    }

    state.storage.delete_root_object(&filename).await?;

    Ok(Json(DeleteResponse {
        status: "success".to_string(),
        message: "File deleted".to_string(),
    }))
}
