//! Request body extractors that reject with [`AppError`].
//!
//! axum's own `Form` rejection answers 415/422 with a plain-text body; these
//! wrappers turn every malformed or incomplete form into a 400
//! `VALIDATION_ERROR` in the usual JSON error shape.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use axum::Form;
use deskline_core::error::CoreError;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Multipart field names accepted for the uploaded file.
pub const FILE_FIELDS: &[&str] = &["attachment", "file"];

/// A urlencoded form body deserialized into `T`.
#[derive(Debug, Clone)]
pub struct FormInput<T>(pub T);

impl<T, S> FromRequest<S> for FormInput<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Core(CoreError::Validation(e.body_text())))?;
        Ok(FormInput(value))
    }
}

/// A multipart read failure. A body over the size limit is a 413; anything
/// else is malformed input.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Text fields and the (first) file of a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub text: HashMap<String, String>,
    /// Client filename and contents. A file input left empty by the browser
    /// (blank filename) is treated as absent.
    pub file: Option<(String, Bytes)>,
}

impl MultipartForm {
    /// Drain a multipart stream.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(multipart_error)?
        {
            let name = field.name().unwrap_or("").to_string();
            if FILE_FIELDS.contains(&name.as_str()) {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;
                if !filename.is_empty() && form.file.is_none() {
                    form.file = Some((filename, data));
                }
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                form.text.insert(name, text);
            }
        }

        Ok(form)
    }

    /// A required text field.
    pub fn required(&self, name: &str) -> Result<String, AppError> {
        self.text.get(name).cloned().ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Missing required field '{name}'"
            )))
        })
    }

    /// An optional text field.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.text.get(name).cloned()
    }
}
