use crate::error::AppError;

/// Allowed declared MIME types. Exact string comparison, no parameter
/// stripping and no content sniffing: the caller-declared type is trusted.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    // Images
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/svg+xml",
    // Video
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/wmv",
    // Audio
    "audio/mp3",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    // Archives
    "application/zip",
    "application/x-zip-compressed",
    "application/rar",
    "application/x-rar-compressed",
    // Documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    // Text and structured text
    "text/plain",
    "text/csv",
    "text/html",
    "text/css",
    "text/javascript",
    "application/json",
    "application/xml",
    "text/xml",
];

/// Validates a declared MIME type against the allow-list
pub fn validate_mime_type(content_type: &str) -> Result<(), AppError> {
    if ALLOWED_MIME_TYPES
        .iter()
        .any(|&allowed| allowed == content_type)
    {
        return Ok(());
    }

    Err(AppError::InvalidInput(format!(
        "File type '{}' is not allowed",
        content_type
    )))
}

/// Sanitizes a caller-supplied folder path. Returns the normalized
/// slash-separated relative path, or an empty string for the root.
///
/// Rejects anything that could escape the storage root: parent-directory
/// segments, absolute paths, backslashes, and control characters. The
/// segments themselves are otherwise taken verbatim.
pub fn sanitize_folder(folder: &str) -> Result<String, AppError> {
    let trimmed = folder.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    if folder.starts_with('/') {
        tracing::warn!("Rejected absolute folder path: {}", folder);
        return Err(AppError::InvalidInput("Invalid folder path".to_string()));
    }

    for segment in trimmed.split('/') {
        let suspicious = segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains('\\')
            || segment.contains('\0')
            || segment.chars().any(|c| c.is_control());
        if suspicious {
            tracing::warn!("Rejected folder path with unsafe segment: {}", folder);
            return Err(AppError::InvalidInput("Invalid folder path".to_string()));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates the filename given to the delete endpoint: a bare root-level
/// name, never a path.
pub fn validate_bare_filename(filename: &str) -> Result<(), AppError> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        tracing::warn!("Rejected delete target: {}", filename);
        return Err(AppError::InvalidInput("Invalid filename".to_string()));
    }
    Ok(())
}
