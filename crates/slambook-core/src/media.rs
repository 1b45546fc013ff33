//! Media file loading
//!
//! Images and videos are stored inline as base64 `data:` URIs. The file's
//! extension decides its MIME type.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{MediaType, NewMedia};
use crate::storage::StorageError;

/// Largest file accepted for upload (10 MiB)
pub const MAX_MEDIA_SIZE: u64 = 10 * 1024 * 1024;

pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub const VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg"];

/// MIME type for a file extension, if it is one we accept
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        _ => return None,
    };
    Some(mime)
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_for_extension)
}

impl MediaType {
    /// MIME types accepted for this kind
    pub fn mime_types(&self) -> &'static [&'static str] {
        match self {
            MediaType::Image => IMAGE_MIME_TYPES,
            MediaType::Video => VIDEO_MIME_TYPES,
        }
    }

    /// Formats named to the user when a file is rejected
    pub fn accepted_formats(&self) -> &'static str {
        match self {
            MediaType::Image => "JPG, PNG, GIF, or WebP",
            MediaType::Video => "MP4, WebM, or OGG",
        }
    }

    pub fn accepts(&self, mime: &str) -> bool {
        self.mime_types().contains(&mime)
    }

    /// Guess the media kind from a file's extension
    pub fn infer(path: &Path) -> Option<MediaType> {
        let mime = mime_for_path(path)?;
        [MediaType::Image, MediaType::Video]
            .into_iter()
            .find(|kind| kind.accepts(mime))
    }
}

/// Read a media file into a `NewMedia` ready to attach to a page
///
/// Fails with `UnsupportedFileType` when the extension isn't one of
/// `media_type`'s formats and with `FileTooLarge` above `MAX_MEDIA_SIZE`.
pub fn load_media_file(
    path: &Path,
    media_type: MediaType,
    caption: Option<String>,
) -> Result<NewMedia> {
    let mime = match mime_for_path(path) {
        Some(mime) if media_type.accepts(mime) => mime,
        _ => {
            return Err(Error::UnsupportedFileType {
                found: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("(none)")
                    .to_string(),
                expected: media_type.accepted_formats().to_string(),
            })
        }
    };

    let size = fs::metadata(path)
        .map_err(|e| StorageError::read_failure(e, path))?
        .len();
    if size > MAX_MEDIA_SIZE {
        return Err(Error::FileTooLarge {
            size,
            max: MAX_MEDIA_SIZE,
        });
    }

    let bytes = fs::read(path).map_err(|e| StorageError::read_failure(e, path))?;
    debug!("Loaded {} ({} bytes) from {:?}", mime, bytes.len(), path);

    Ok(NewMedia {
        media_type,
        url: format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)),
        caption,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("webm"), Some("video/webm"));
        assert_eq!(mime_for_extension("bmp"), None);
    }

    #[test]
    fn test_infer() {
        assert_eq!(
            MediaType::infer(&PathBuf::from("cat.png")),
            Some(MediaType::Image)
        );
        assert_eq!(
            MediaType::infer(&PathBuf::from("clip.mp4")),
            Some(MediaType::Video)
        );
        assert_eq!(MediaType::infer(&PathBuf::from("notes.txt")), None);
        assert_eq!(MediaType::infer(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_load_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dot.gif");
        fs::write(&path, b"GIF89a").unwrap();

        let media = load_media_file(&path, MediaType::Image, Some("tiny".to_string())).unwrap();
        assert_eq!(media.media_type, MediaType::Image);
        assert_eq!(media.url, "data:image/gif;base64,R0lGODlh");
        assert_eq!(media.caption.as_deref(), Some("tiny"));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clip.mp4");
        fs::write(&path, b"data").unwrap();

        match load_media_file(&path, MediaType::Image, None).unwrap_err() {
            Error::UnsupportedFileType { found, expected } => {
                assert_eq!(found, "mp4");
                assert_eq!(expected, "JPG, PNG, GIF, or WebP");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_too_large_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.webm");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_MEDIA_SIZE + 1).unwrap();

        let err = load_media_file(&path, MediaType::Video, None).unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { size, .. } if size == MAX_MEDIA_SIZE + 1));
    }

    #[test]
    fn test_missing_file() {
        let err = load_media_file(&PathBuf::from("/nonexistent/a.png"), MediaType::Image, None)
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
