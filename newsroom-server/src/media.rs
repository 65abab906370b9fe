//! Reporter media uploads
//!
//! Files are checked by extension, size and magic bytes before being written
//! under `<upload_root>/images` or `<upload_root>/videos` with a unique name.

use chrono::{DateTime, Utc};
use infer::MatcherType;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Files accepted per upload request
pub const MAX_FILES_PER_REQUEST: usize = 10;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Request body cap for upload routes: a full batch plus multipart framing
pub const UPLOAD_BODY_LIMIT: usize = MAX_FILES_PER_REQUEST * MAX_VIDEO_BYTES + 1024 * 1024;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Folder under the upload root, also the public URL prefix
    pub fn folder(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "img_",
            MediaKind::Video => "vid_",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            MediaKind::Image => MAX_IMAGE_BYTES,
            MediaKind::Video => MAX_VIDEO_BYTES,
        }
    }
}

/// A file written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    /// Name the client sent
    pub filename: String,
    /// `static/<folder>/<name>`, as attached to submissions
    pub path: String,
    /// Public URL served from the upload folder
    pub url: String,
}

/// Reduce a client-supplied name to `[A-Za-z0-9._-]`
///
/// Path separators become spaces, whitespace runs become `_`, and leading
/// or trailing dots and underscores are removed, so the result can never
/// name a parent directory.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-cased extension without the dot
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// `{img_|vid_}{YYYYmmdd_HHMMSS}_{8 hex}_{secure stem}.{ext}`
pub fn unique_filename(original: &str, kind: MediaKind, at: DateTime<Utc>) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .map(|s| secure_filename(&s.to_string_lossy()))
        .unwrap_or_default();
    let ext = file_extension(original)
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let unique_id = Uuid::new_v4().simple().to_string();

    format!(
        "{}{}_{}_{}{}",
        kind.prefix(),
        at.format("%Y%m%d_%H%M%S"),
        &unique_id[..8],
        stem,
        ext
    )
}

/// Reject content whose magic bytes say it is something other than `kind`
///
/// Unrecognised content passes; audio passes for videos because MP4
/// containers are often reported as audio.
pub fn check_content(kind: MediaKind, bytes: &[u8]) -> Result<(), String> {
    let Some(detected) = infer::get(bytes) else {
        return Ok(());
    };

    let acceptable = match kind {
        MediaKind::Image => matches!(detected.matcher_type(), MatcherType::Image),
        MediaKind::Video => matches!(
            detected.matcher_type(),
            MatcherType::Video | MatcherType::Audio
        ),
    };

    if acceptable {
        Ok(())
    } else {
        Err(format!(
            "File content ({}) does not match a {}",
            detected.mime_type(),
            kind.label()
        ))
    }
}

/// Reject names whose extension is not allowed for `kind`
pub fn check_extension(kind: MediaKind, filename: &str) -> Result<(), String> {
    let ext = file_extension(filename).unwrap_or_default();
    if kind.extensions().contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(format!(
            "File extension .{} not allowed for {}s",
            ext,
            kind.label()
        ))
    }
}

pub fn too_large_message(kind: MediaKind) -> String {
    format!(
        "File too large. Max size: {}MB",
        kind.max_bytes() / (1024 * 1024)
    )
}

/// Validate one uploaded file, returning the reason it was rejected
pub fn validate_upload(kind: MediaKind, filename: &str, bytes: &[u8]) -> Result<(), String> {
    check_extension(kind, filename)?;

    if bytes.len() > kind.max_bytes() {
        return Err(too_large_message(kind));
    }

    check_content(kind, bytes)
}

/// Validate and write an upload under `upload_root`
pub async fn save_upload(
    upload_root: &Path,
    kind: MediaKind,
    filename: &str,
    bytes: &[u8],
) -> Result<StoredUpload, String> {
    validate_upload(kind, filename, bytes)?;

    let name = unique_filename(filename, kind, Utc::now());
    let folder: PathBuf = upload_root.join(kind.folder());
    let target = folder.join(&name);

    let write = async {
        tokio::fs::create_dir_all(&folder).await?;
        tokio::fs::write(&target, bytes).await
    };
    if let Err(e) = write.await {
        warn!("Failed to store upload {}: {}", target.display(), e);
        return Err(format!("Error saving file: {}", e));
    }

    debug!(file = %name, size = bytes.len(), "Stored {}", kind.label());

    Ok(StoredUpload {
        filename: filename.to_string(),
        path: format!("static/{}/{}", kind.folder(), name),
        url: format!("/{}/{}", kind.folder(), name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_unique_filename_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = unique_filename("Flood photo.JPG", MediaKind::Image, at);

        assert!(name.starts_with("img_20240309_140507_"), "{}", name);
        assert!(name.ends_with("_Flood_photo.jpg"), "{}", name);
        let id = &name["img_20240309_140507_".len()..][..8];
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let other = unique_filename("Flood photo.JPG", MediaKind::Image, at);
        assert_ne!(name, other);
    }

    #[test]
    fn test_extension_checks() {
        assert!(validate_upload(MediaKind::Image, "a.png", PNG_HEADER).is_ok());
        assert_eq!(
            validate_upload(MediaKind::Image, "a.exe", PNG_HEADER),
            Err("File extension .exe not allowed for images".into())
        );
        assert!(validate_upload(MediaKind::Video, "clip.png", PNG_HEADER).is_err());
    }

    #[test]
    fn test_size_limit() {
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert_eq!(
            validate_upload(MediaKind::Image, "big.jpg", &big),
            Err("File too large. Max size: 10MB".into())
        );
    }

    #[test]
    fn test_content_must_match_kind() {
        assert!(check_content(MediaKind::Image, PNG_HEADER).is_ok());
        assert!(check_content(MediaKind::Video, PNG_HEADER).is_err());
        assert!(check_content(MediaKind::Image, b"plain bytes").is_ok());
    }

    #[tokio::test]
    async fn test_save_upload_writes_under_folder() {
        let dir = tempfile::TempDir::new().unwrap();
        let stored = save_upload(dir.path(), MediaKind::Image, "scene.png", PNG_HEADER)
            .await
            .unwrap();

        assert!(stored.path.starts_with("static/images/img_"));
        assert!(stored.url.starts_with("/images/img_"));
        let name = stored.path.trim_start_matches("static/images/");
        assert!(dir.path().join("images").join(name).exists());
    }
}
