//! `data:` URLs carrying base64 images, as produced by the browser's
//! canvas and FileReader APIs.

use std::fmt;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

use crate::conversation::{Blob, Part};

const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image must be a base64 data URL")]
    NotDataUrl,
    #[error("image data URL has no mime type")]
    MissingMimeType,
    #[error("image data URL has no payload")]
    EmptyPayload,
    #[error("unsupported image type: {0}")]
    UnsupportedExtension(String),
    #[error("failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A parsed `data:<mime>;base64,<payload>` image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    data: String,
}

impl DataUrl {
    pub fn parse(s: &str) -> Result<Self, ImageError> {
        let rest = s.strip_prefix("data:").ok_or(ImageError::NotDataUrl)?;
        let marker = rest.find(BASE64_MARKER).ok_or(ImageError::NotDataUrl)?;

        let mime_type = &rest[..marker];
        if mime_type.is_empty() {
            return Err(ImageError::MissingMimeType);
        }

        // Payload is everything after the first comma.
        let data = s
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or_default();
        if data.is_empty() {
            return Err(ImageError::EmptyPayload);
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Read an image from disk and encode it.
    pub fn from_file(path: &Path) -> Result<Self, ImageError> {
        let mime_type = mime_for_path(path)?;
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_bytes(mime_type, &bytes))
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_part(&self) -> Part {
        Part::Inline {
            inline_data: Blob {
                mime_type: self.mime_type.clone(),
                data: self.data.clone(),
            },
        }
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{}{}{}", self.mime_type, BASE64_MARKER, self.data)
    }
}

fn mime_for_path(path: &Path) -> Result<&'static str, ImageError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        _ => return Err(ImageError::UnsupportedExtension(ext)),
    };
    Ok(mime)
}
