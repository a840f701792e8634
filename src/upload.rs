//! Validation and transient storage of uploaded menu photos.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// The upload is not something we accept. Always the user's fault, never ours.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageValidationError {
    #[error("Uploaded file is empty")]
    EmptyContent,

    #[error("No filename provided")]
    MissingFilename,

    #[error("Unsupported file type '{0}'. Allowed types: jpg, jpeg, png, webp, gif")]
    UnsupportedType(String),

    #[error("File too large ({size} bytes). Maximum size is {max_mb} MB")]
    TooLarge { size: usize, max_mb: u64 },

    #[error("File content is not a valid image")]
    NotAnImage,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Invalid(#[from] ImageValidationError),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded image on disk. The file is removed when this is dropped,
/// including during unwinding.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {}: {}", self.path.display(), e),
        }
    }
}

fn sniff_matches_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
        || (bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP")
}

/// Check an upload against the size and type rules and return its normalized extension.
pub fn validate_image(
    bytes: &[u8],
    filename: &str,
    max_bytes: usize,
) -> Result<String, ImageValidationError> {
    if filename.trim().is_empty() {
        return Err(ImageValidationError::MissingFilename);
    }
    if bytes.is_empty() {
        return Err(ImageValidationError::EmptyContent);
    }

    let extension = Path::new(filename.trim())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageValidationError::UnsupportedType(extension));
    }

    if bytes.len() > max_bytes {
        return Err(ImageValidationError::TooLarge {
            size: bytes.len(),
            max_mb: (max_bytes / (1024 * 1024)) as u64,
        });
    }

    if !sniff_matches_image(bytes) {
        return Err(ImageValidationError::NotAnImage);
    }

    Ok(extension)
}

/// Validate `bytes` and write them to a uniquely named file in `upload_dir`.
pub async fn save_uploaded_image(
    bytes: &[u8],
    filename: &str,
    upload_dir: &Path,
    max_bytes: usize,
) -> Result<TempUpload, UploadError> {
    let extension = validate_image(bytes, filename, max_bytes)?;

    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(format!("{}.{}", Uuid::new_v4(), extension));
    // guard first so a failed write still cleans up a partial file
    let upload = TempUpload { path };
    tokio::fs::write(upload.path(), bytes).await?;

    debug!("Stored upload ({} bytes) at {}", bytes.len(), upload.path().display());
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAX: usize = 1024;

    fn jpeg() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(&[0u8; 32]);
        bytes
    }

    #[tokio::test]
    async fn test_save_and_remove_on_drop() {
        let dir = TempDir::new().unwrap();
        let upload = save_uploaded_image(&jpeg(), "menu.JPG", dir.path(), MAX)
            .await
            .unwrap();

        let path = upload.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(&path).unwrap(), jpeg());

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unique_names() {
        let dir = TempDir::new().unwrap();
        let a = save_uploaded_image(&jpeg(), "a.jpg", dir.path(), MAX).await.unwrap();
        let b = save_uploaded_image(&jpeg(), "a.jpg", dir.path(), MAX).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_creates_missing_upload_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested/uploads");
        let upload = save_uploaded_image(&jpeg(), "a.jpeg", &nested, MAX).await.unwrap();
        assert!(upload.path().starts_with(&nested));
    }

    #[tokio::test]
    async fn test_invalid_upload_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = save_uploaded_image(b"", "a.jpg", dir.path(), MAX).await;
        assert!(matches!(
            result,
            Err(UploadError::Invalid(ImageValidationError::EmptyContent))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_validate_rejections() {
        assert_eq!(
            validate_image(&jpeg(), "", MAX),
            Err(ImageValidationError::MissingFilename)
        );
        assert_eq!(
            validate_image(&jpeg(), "menu.pdf", MAX),
            Err(ImageValidationError::UnsupportedType("pdf".to_string()))
        );
        assert_eq!(
            validate_image(&jpeg(), "menu", MAX),
            Err(ImageValidationError::UnsupportedType(String::new()))
        );
        assert_eq!(
            validate_image(b"%PDF-1.4 not an image", "menu.png", MAX),
            Err(ImageValidationError::NotAnImage)
        );
        assert!(matches!(
            validate_image(&vec![0xFF; MAX + 1], "menu.jpg", MAX),
            Err(ImageValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_known_signatures() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(validate_image(&png, "m.png", MAX).unwrap(), "png");
        assert_eq!(validate_image(b"GIF89a....", "m.gif", MAX).unwrap(), "gif");
        assert_eq!(validate_image(b"RIFF\0\0\0\0WEBPVP8 ", "m.webp", MAX).unwrap(), "webp");
    }
}
