use std::io::Write;
use std::path::Path;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::request_id_from;
use crate::models::{ParseResponse, Upload};
use crate::services::decode_completion;

/// `POST /api/parse-pdf`: decrypt, extract and analyze a statement with the
/// completion model.
pub async fn parse_pdf_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Json<ParseResponse>> {
    let start = Instant::now();
    let request_id = request_id_from(&headers);

    let upload = read_upload(multipart, state.config.max_upload_size_mb).await?;
    info!(
        request_id = %request_id,
        file_name = %upload.file_name,
        file_size = upload.size(),
        "Statement upload received"
    );

    let temp = persist_upload(&state.config.upload_dir, &upload).await?;
    let result = state.pipeline.run(temp.path(), &upload.password).await;
    remove_temp(temp, &request_id);
    let raw = result?;

    let data = decode_completion(&raw);
    info!(
        request_id = %request_id,
        structured = data.is_object(),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Statement parsed"
    );

    Ok(Json(ParseResponse::success(data)))
}

/// `POST /api/parse-pdf/local`: same upload contract, fields extracted with
/// the regex heuristics instead of the completion model.
pub async fn parse_pdf_local_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AppResult<Json<ParseResponse>> {
    let start = Instant::now();
    let request_id = request_id_from(&headers);

    let upload = read_upload(multipart, state.config.max_upload_size_mb).await?;
    info!(
        request_id = %request_id,
        file_name = %upload.file_name,
        file_size = upload.size(),
        "Statement upload received for local parsing"
    );

    let temp = persist_upload(&state.config.upload_dir, &upload).await?;
    let result = state.pipeline.extract_text(temp.path(), &upload.password).await;
    remove_temp(temp, &request_id);
    let text = result?;

    let info = state.matchers.extract(&text);
    let data = serde_json::to_value(&info)
        .map_err(|e| AppError::internal(format!("failed to serialize statement fields: {}", e)))?;

    info!(
        request_id = %request_id,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Statement parsed locally"
    );

    Ok(Json(ParseResponse::success(data)))
}

/// Reads the `password` and `pdf` fields, then validates them in that order.
async fn read_upload(mut multipart: Multipart, limit_mb: usize) -> AppResult<Upload> {
    let mut password: Option<String> = None;
    let mut pdf: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "password" => {
                let value = field.text().await.map_err(|e| multipart_error(e, limit_mb))?;
                password = Some(value);
            }
            "pdf" => {
                // A `pdf` value without a filename is a plain form field, not an upload.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    debug!("Ignoring pdf field without a filename");
                    continue;
                };
                let data = field.bytes().await.map_err(|e| multipart_error(e, limit_mb))?;
                pdf = Some((file_name, data));
            }
            other => {
                debug!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    let password = password.filter(|p| !p.is_empty()).ok_or(AppError::MissingPassword)?;
    let (file_name, content) = pdf.ok_or(AppError::MissingFile)?;

    let upload = Upload::new(file_name, password, content);
    if !upload.has_pdf_extension() {
        return Err(AppError::invalid_file("Only PDF files are allowed"));
    }

    Ok(upload)
}

fn multipart_error(err: MultipartError, limit_mb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { limit: limit_mb }
    } else {
        AppError::InvalidMultipart {
            message: err.body_text(),
        }
    }
}

/// Writes the upload to `upload_<random>_<name>` inside `dir`.
///
/// The returned guard deletes the file when dropped.
async fn persist_upload(dir: &Path, upload: &Upload) -> AppResult<NamedTempFile> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        warn!(dir = %dir.display(), error = %e, "Failed to create upload directory");
        AppError::temp_file("Failed to create tmp directory")
    })?;

    let dir = dir.to_path_buf();
    let suffix = format!("_{}", upload.safe_name());
    let content = upload.content.clone();

    tokio::task::spawn_blocking(move || -> AppResult<NamedTempFile> {
        let mut temp = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|e| {
                warn!(dir = %dir.display(), error = %e, "Failed to create temp file");
                AppError::temp_file("Failed to create temporary file")
            })?;

        temp.write_all(&content)
            .and_then(|_| temp.flush())
            .map_err(|e| AppError::temp_file(format!("Failed to save uploaded file: {}", e)))?;

        debug!(path = %temp.path().display(), bytes = content.len(), "Upload written to temp file");
        Ok(temp)
    })
    .await?
}

fn remove_temp(temp: NamedTempFile, request_id: &str) {
    let path = temp.path().to_path_buf();
    match temp.close() {
        Ok(()) => debug!(request_id = %request_id, path = %path.display(), "Temp file removed"),
        Err(e) => warn!(
            request_id = %request_id,
            path = %path.display(),
            error = %e,
            "Failed to remove temp file"
        ),
    }
}
