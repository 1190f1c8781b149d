//! Storage key layout.
//!
//! ```text
//! inputs/<sha256 of bytes>.<ext>      uploaded photos to restyle
//! training/<sha256 of bytes>.<ext>    model training images
//! promoted/<sha256 of source url>.<ext>
//! gallery/index.json
//! ```

use atelier_core::hashing::sha256_hex;

use crate::StorageError;

pub const INPUTS_PREFIX: &str = "inputs";
pub const TRAINING_PREFIX: &str = "training";
pub const PROMOTED_PREFIX: &str = "promoted";
pub const GALLERY_INDEX_KEY: &str = "gallery/index.json";

/// File extension for a content type, falling back to `bin`.
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "application/json" => "json",
        _ => "bin",
    }
}

/// Content-addressed key for uploaded bytes under `prefix`.
pub fn content_key(prefix: &str, bytes: &[u8], extension: &str) -> String {
    format!("{prefix}/{}.{extension}", sha256_hex(bytes))
}

/// Key for an artifact promoted from a remote URL.
pub fn promoted_key(source_url: &str, content_type: &str) -> String {
    format!(
        "{PROMOTED_PREFIX}/{}.{}",
        sha256_hex(source_url.as_bytes()),
        extension_for(content_type)
    )
}

/// Reject keys that are empty, absolute, or contain `..` segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Join a public base URL and a key with exactly one slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
