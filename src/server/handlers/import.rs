//! Dump upload handler.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Response,
};

use super::super::types::AppState;
use super::{error_response, json_response};
use crate::config::UPLOAD_FIELD_NAME;
use crate::error_handling::ImportError;
use crate::import::import_bytes;

/// Accepts a multipart upload and imports the dump in its `file` field
pub async fn import_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return error_response(StatusCode::BAD_REQUEST, ImportError::MissingFile.to_string())
        }
        Err(e) => {
            log::warn!("Rejected upload: {}", e);
            return error_response(e.status(), e.body_text());
        }
    };

    log::info!("Received dump upload ({} bytes)", bytes.len());
    match import_bytes(&state.store, &bytes, &state.catalog).await {
        Ok(report) => json_response(StatusCode::OK, &report),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                log::error!("Import failed: {}", e);
            } else {
                log::warn!("Import rejected: {}", e);
            }
            error_response(status, e.to_string())
        }
    }
}

/// Returns the bytes of the upload field, skipping any other fields.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD_NAME) {
            return Ok(Some(field.bytes().await?.to_vec()));
        }
    }
    Ok(None)
}

/// HTTP status for a failed import.
pub(crate) fn status_for(error: &ImportError) -> StatusCode {
    if error.is_duplicate() {
        StatusCode::CONFLICT
    } else if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
