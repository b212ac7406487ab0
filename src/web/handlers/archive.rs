//! Archive handlers: upload, listing and download.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use super::{run_blocking, AppState};
use crate::archive::{parse_archive_id, Archive, NewArchive, DEFAULT_CREATE_ATTEMPTS};
use crate::web::error::ApiError;

/// Multipart field carrying the uploader's auth code.
pub const FIELD_AUTH_CODE: &str = "ar_auth_code";
/// Multipart field carrying the file.
pub const FIELD_FILE: &str = "ar_file";
/// Multipart field carrying the archive title.
pub const FIELD_NAME: &str = "ar_name";
/// Multipart field carrying the document date.
pub const FIELD_DATED: &str = "ar_dated";
/// Multipart field carrying the document type.
pub const FIELD_TYPE: &str = "ar_type";
/// Multipart field carrying the author.
pub const FIELD_AUTHOR: &str = "ar_author";

/// Upload form contents.
#[derive(Debug, Default)]
struct UploadForm {
    auth_code: String,
    file_name: Option<String>,
    content_md5: String,
    content: Option<Vec<u8>>,
    name: String,
    dated_on: String,
    kind: String,
    author: String,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::error!("Failed to read multipart field: {}", e);
            ApiError::bad_request("Invalid multipart data")
        })? {
            let name = field.name().unwrap_or("").to_string();

            if name == FIELD_FILE {
                form.file_name = field.file_name().map(|s| base_name(s).to_string());
                form.content_md5 = field
                    .headers()
                    .get("content-md5")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                form.content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to read file content: {}", e);
                            ApiError::bad_request("Failed to read file")
                        })?
                        .to_vec(),
                );
                continue;
            }

            let target = match name.as_str() {
                FIELD_AUTH_CODE => &mut form.auth_code,
                FIELD_NAME => &mut form.name,
                FIELD_DATED => &mut form.dated_on,
                FIELD_TYPE => &mut form.kind,
                FIELD_AUTHOR => &mut form.author,
                _ => continue,
            };
            *target = field.text().await.map_err(|e| {
                tracing::error!("Failed to read field {}: {}", name, e);
                ApiError::bad_request(format!("Invalid field: {name}"))
            })?;
        }

        Ok(form)
    }
}

/// Strip any client-side directory from an uploaded file name.
fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are removed, and names that are not plain ASCII also
/// get an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// POST /api/archive/create - Upload a file with its metadata.
///
/// Request body: multipart/form-data with `ar_auth_code`, `ar_file`,
/// `ar_name`, `ar_dated`, `ar_type` and `ar_author`. Redirects to `/` on
/// success or when no auth code was sent, and to `/error` when the auth code
/// is unknown.
pub async fn create_archive(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;

    let Some(uploader) = state.uploader_for(&form.auth_code) else {
        if form.auth_code.is_empty() {
            tracing::warn!("Upload rejected: missing auth code");
            return Ok(Redirect::to("/").into_response());
        }
        tracing::warn!("Upload rejected: invalid auth code");
        return Ok(Redirect::to("/error").into_response());
    };

    let file_name = form
        .file_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = form
        .content
        .ok_or_else(|| ApiError::bad_request("No file content"))?;

    let new_archive = NewArchive::new(uploader, file_name, content.len() as u64)
        .with_md5_sum(form.content_md5)
        .with_name(form.name)
        .with_dated_on(form.dated_on)
        .with_kind(form.kind)
        .with_author(form.author);

    let store = state.store.clone();
    let archive = run_blocking(move || {
        store.create_with_retry(&mut content.as_slice(), &new_archive, DEFAULT_CREATE_ATTEMPTS)
    })
    .await?;

    tracing::info!(
        id = archive.id,
        uploader = %archive.uploader,
        "Archive uploaded: {}",
        archive.name
    );

    Ok(Redirect::to("/").into_response())
}

/// GET /api/archives - List all archives, newest first.
pub async fn list_archives(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Archive>>, ApiError> {
    let store = state.store.clone();
    let mut archives = run_blocking(move || store.list()).await?;
    archives.sort_unstable_by(|a, b| b.id.cmp(&a.id));

    Ok(Json(archives))
}

/// GET /api/archive/:id - Download an archive's content file.
pub async fn download_archive(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_archive_id(&raw_id).ok_or_else(|| {
        tracing::warn!("Invalid archive ID: {}", raw_id);
        ApiError::bad_request("Invalid archive ID")
    })?;

    let store = state.store.clone();
    let (archive, path) = run_blocking(move || {
        let archive = store.get(id)?;
        let path = store.content_path(id)?;
        Ok((archive, path))
    })
    .await?;

    let content = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(id, "Failed to read archive file: {}", e);
        ApiError::internal("Failed to read archive file")
    })?;

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&archive.file_name),
        )
        .header(header::CONTENT_LENGTH, content.len());

    // Recorded verbatim at upload; skipped when it is not a valid header value.
    if let Some(md5) = archive.md5().and_then(|v| HeaderValue::from_str(v).ok()) {
        builder = builder.header("Content-MD5", md5);
    }

    let response = builder
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    tracing::info!(id, "Archive downloaded");

    Ok(response)
}
