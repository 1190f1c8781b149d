//! Header-only inspection of uploaded images.
//!
//! Reads just enough of the upload to learn its format and dimensions
//! without decoding pixel data.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::error::CoreError;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Format and size of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }
}

/// Probe `bytes` for a supported image (PNG, JPEG or WebP).
pub fn probe_image(bytes: &[u8]) -> Result<ImageInfo, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Uploaded image is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "Uploaded image exceeds {MAX_UPLOAD_BYTES} bytes"
        )));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;

    let format = match reader.format() {
        Some(f @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)) => f,
        Some(other) => {
            return Err(CoreError::Validation(format!(
                "Unsupported image format: {other:?}"
            )))
        }
        None => return Err(CoreError::Validation("Unrecognized image format".into())),
    };

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Unreadable image header: {e}")))?;

    Ok(ImageInfo {
        format,
        width,
        height,
    })
}
