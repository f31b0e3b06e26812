use axum::{extract::Multipart, http::StatusCode};

use crate::dto::common::ok;
use crate::error::{Error, Result};
use crate::utils::upload::{self, UploadKind};

async fn handle_upload(
    kind: UploadKind,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_none() {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let data = field.bytes().await?;
        if data.is_empty() {
            continue;
        }

        let path = upload::save_upload(kind, &filename, &data).await?;
        let url = crate::config::get_config().public_upload_url(&path);
        return Ok((
            StatusCode::CREATED,
            ok("File uploaded", serde_json::json!({ "url": url })),
        ));
    }
    Err(Error::BadRequest("No file provided".into()))
}

pub async fn profile_image(multipart: Multipart) -> Result<impl axum::response::IntoResponse> {
    handle_upload(upload::PROFILE_IMAGE, multipart).await
}

pub async fn resume(multipart: Multipart) -> Result<impl axum::response::IntoResponse> {
    handle_upload(upload::RESUME, multipart).await
}

pub async fn certificate(multipart: Multipart) -> Result<impl axum::response::IntoResponse> {
    handle_upload(upload::CERTIFICATE, multipart).await
}
