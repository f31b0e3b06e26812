use crate::error::{Error, Result};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct UploadKind {
    pub dir: &'static str,
    pub allowed_exts: &'static [&'static str],
    pub max_bytes: usize,
}

pub const PROFILE_IMAGE: UploadKind = UploadKind {
    dir: "images",
    allowed_exts: &["jpg", "jpeg", "png", "webp"],
    max_bytes: 2 * 1024 * 1024,
};

pub const RESUME: UploadKind = UploadKind {
    dir: "resumes",
    allowed_exts: &["pdf", "doc", "docx"],
    max_bytes: 5 * 1024 * 1024,
};

pub const CERTIFICATE: UploadKind = UploadKind {
    dir: "certificates",
    allowed_exts: &["pdf", "jpg", "jpeg", "png"],
    max_bytes: 10 * 1024 * 1024,
};

pub const SPREADSHEET: UploadKind = UploadKind {
    dir: "tmp",
    allowed_exts: &["xlsx", "xls"],
    max_bytes: 10 * 1024 * 1024,
};

/// Validates and persists an uploaded file, returning the path relative to
/// the uploads directory.
pub async fn save_upload(kind: UploadKind, filename: &str, data: &bytes::Bytes) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    if !kind.allowed_exts.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }
    if data.len() > kind.max_bytes {
        return Err(Error::BadRequest(format!(
            "File exceeds the {} MB limit",
            kind.max_bytes / (1024 * 1024)
        )));
    }

    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::BadRequest("Invalid JPEG file content".into()));
    }
    if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Err(Error::BadRequest("Invalid PNG file content".into()));
    }

    let uploads_dir = &crate::config::get_config().uploads_dir;
    let target_dir = format!("{}/{}", uploads_dir, kind.dir);
    fs::create_dir_all(&target_dir)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

    let safe_filename = format!("{}.{}", Uuid::new_v4(), ext);
    let file_path = format!("{}/{}", target_dir, safe_filename);

    fs::write(&file_path, data).await.map_err(|e| {
        tracing::error!("Failed to write upload: {}", e);
        Error::Internal(format!("Failed to save file: {}", e))
    })?;

    Ok(format!("{}/{}", kind.dir, safe_filename))
}

/// Best-effort cleanup for temp files; failures are logged, never surfaced.
pub async fn remove_quietly(relative: &str) {
    let uploads_dir = &crate::config::get_config().uploads_dir;
    let path = format!("{}/{}", uploads_dir, relative.trim_start_matches('/'));
    if let Err(e) = fs::remove_file(&path).await {
        tracing::warn!("Failed to remove temp upload {}: {}", path, e);
    }
}
