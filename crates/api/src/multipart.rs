//! Buffered multipart form reading.
//!
//! Upload handlers need text fields (e.g. `width`) to be interpreted together
//! with the file they describe, so the whole form is read up front into a
//! [`MultipartForm`] and then queried by field name.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use axum::extract::Multipart;

use crate::error::{AppError, AppResult};

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// All fields of a multipart request.
#[derive(Debug, Default)]
pub struct MultipartForm {
    text: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Drain `multipart`. Parts carrying a filename are files, the rest text.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.files.push(UploadedFile {
                        field: name,
                        file_name: Some(file_name),
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.text.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value of `name`; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Parse the text value of `name`, if present.
    pub fn parse<T>(&self, name: &str) -> AppResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(name)
            .map(|raw| {
                raw.parse().map_err(|e| {
                    AppError::BadRequest(format!("Invalid value for '{name}': {e}"))
                })
            })
            .transpose()
    }

    /// Remove and return the first file uploaded under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(index))
    }

    /// Remove and return every file uploaded under `name`, in upload order.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == name);
        self.files = rest;
        taken
    }
}
