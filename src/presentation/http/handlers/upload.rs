//! Upload Handlers
//!
//! Multipart file upload backed by the object-storage collaborator. Keys
//! are namespaced per user; only the uploader (or a super admin) may delete.

use axum::{
    body::Body,
    extract::{Extension, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::application::dto::response::{ApiResponse, UploadResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Largest accepted upload, in bytes.
const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Store the first file field of a multipart request.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("No file field in request".into()))?;

    let original_name = field
        .file_name()
        .map(sanitize_file_name)
        .unwrap_or_else(|| "file".to_string());

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::BadRequest(format!(
            "Uploaded file exceeds {} bytes",
            MAX_UPLOAD_SIZE
        )));
    }

    let key = format!("{}/{}-{}", auth.user_id, Uuid::new_v4(), original_name);
    let size = bytes.len();

    state.storage.save(&key, bytes.to_vec()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("File uploaded", UploadResponse { key, size })),
    ))
}

/// Stream a stored object back.
pub async fn download_file(
    State(state): State<AppState>,
    Path((user_id, file)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let key = format!("{}/{}", user_id, file);
    let bytes = state.storage.get(&key).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Remove a stored object (uploader or super admin).
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, file)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if user_id != auth.user_id.to_string() && !auth.is_super_admin {
        return Err(AppError::Forbidden("Permission denied".into()));
    }

    let key = format!("{}/{}", user_id, file);
    state.storage.delete(&key).await?;

    Ok(Json(ApiResponse::message("File deleted")))
}

/// Keep file names to a safe character set.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_file_name("späce file!.jpg"), "sp_ce_file_.jpg");
        assert_eq!(sanitize_file_name(""), "file");
    }
}
