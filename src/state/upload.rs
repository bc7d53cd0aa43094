//! Local image probing before upload

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ImageUpload;
use crate::form::FieldValue;

/// Largest image accepted for upload
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Where an uploaded image ends up, which fixes its minimum size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    ProfilePicture,
    HeaderImage,
}

impl ImageTarget {
    pub fn min_dimensions(&self) -> (u32, u32) {
        match self {
            ImageTarget::ProfilePicture => (176, 99),
            ImageTarget::HeaderImage => (608, 147),
        }
    }

    /// Basic-info field receiving the uploaded filename
    pub fn field_name(&self) -> &'static str {
        match self {
            ImageTarget::ProfilePicture => "profilePicture",
            ImageTarget::HeaderImage => "headerImage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageTarget::ProfilePicture => "Profile picture",
            ImageTarget::HeaderImage => "Header image",
        }
    }

    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "profilePicture" => Some(ImageTarget::ProfilePicture),
            "headerImage" => Some(ImageTarget::HeaderImage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Only JPEG and PNG images are supported")]
    Unsupported,

    #[error("Image is too large ({size} bytes, max 10 MiB)")]
    TooLarge { size: u64 },
}

/// An image read from disk with its pixel size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedImage {
    pub file_name: String,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ProbedImage {
    pub fn dimensions(&self) -> FieldValue {
        FieldValue::Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    pub fn into_upload(self) -> ImageUpload {
        ImageUpload {
            file_name: self.file_name,
            mime: self.kind.mime().to_string(),
            bytes: self.bytes,
        }
    }
}

/// Read `path`, enforcing the size limit and the JPEG/PNG restriction
pub async fn probe_file(path: PathBuf) -> Result<ProbedImage, UploadError> {
    let io_err = |source| UploadError::Io {
        path: path.display().to_string(),
        source,
    };
    let metadata = tokio::fs::metadata(&path).await.map_err(io_err)?;
    if metadata.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge {
            size: metadata.len(),
        });
    }
    let bytes = tokio::fs::read(&path).await.map_err(io_err)?;
    let (kind, width, height) = sniff(&bytes).ok_or(UploadError::Unsupported)?;
    Ok(ProbedImage {
        file_name: file_name_of(&path),
        kind,
        width,
        height,
        bytes,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

/// Detect the image type and read its pixel size from the header
pub fn sniff(bytes: &[u8]) -> Option<(ImageKind, u32, u32)> {
    if bytes.starts_with(PNG_SIGNATURE) {
        let (w, h) = png_dimensions(bytes)?;
        return Some((ImageKind::Png, w, h));
    }
    if bytes.starts_with(&[0xFF, 0xD8]) {
        let (w, h) = jpeg_dimensions(bytes)?;
        return Some((ImageKind::Jpeg, w, h));
    }
    None
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    // signature, chunk length, "IHDR", width, height
    if bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((be_u32(bytes, 16)?, be_u32(bytes, 20)?))
}

fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    loop {
        if *bytes.get(i)? != 0xFF {
            return None;
        }
        let mut marker = *bytes.get(i + 1)?;
        while marker == 0xFF {
            i += 1;
            marker = *bytes.get(i + 1)?;
        }
        match marker {
            // standalone markers carry no length
            0x01 | 0xD0..=0xD8 => i += 2,
            0xD9 | 0xDA => return None,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let height = be_u16(bytes, i + 5)?;
                let width = be_u16(bytes, i + 7)?;
                return Some((u32::from(width), u32::from(height)));
            }
            _ => {
                let len = be_u16(bytes, i + 2)? as usize;
                i += 2 + len;
            }
        }
    }
}
