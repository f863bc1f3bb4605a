//! Request body extraction shared by the create and update handlers.
//!
//! The catalog is driven by browser forms (multipart, so images can ride
//! along) as well as plain JSON clients. Both end up as a [`FormPayload`]:
//! a map of field values plus the uploaded files.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::ValidationError;

/// Field names that carry form plumbing rather than data.
const IGNORED_FIELDS: [&str; 2] = ["_method", "_token"];

#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Clone, Debug, Default)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    pub files: Vec<UploadedFile>,
}

/// `Path` extractor that rejects with the JSON error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Query` extractor that rejects with the JSON error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            let fields = pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(Self::from_fields(fields));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(fields)) => Ok(Self::from_fields(fields)),
            Ok(_) => Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
            Err(e) => Err(AppError::BadRequest(format!("Malformed JSON body: {}", e))),
        }
    }
}

impl FormPayload {
    /// Empty strings count as null, the way HTML forms submit blank inputs.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(key, _)| !IGNORED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| match value {
                Value::String(text) if text.trim().is_empty() => (key, Value::Null),
                other => (key, other),
            })
            .collect();

        Self {
            fields,
            files: Vec::new(),
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = Map::new();
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::BadRequest("Invalid multipart data".to_string()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
                // Browsers send an empty part for untouched file inputs.
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                files.push(UploadedFile {
                    field: name,
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
                fields.insert(name, Value::String(text));
            }
        }

        let mut payload = Self::from_fields(fields);
        payload.files = files;
        Ok(payload)
    }

    /// Whether the field was submitted at all, null included.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.field == field)
    }

    pub fn text(&self, key: &'static str) -> Result<Option<String>, ValidationError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.trim().to_string())),
            Some(Value::Number(number)) => Ok(Some(number.to_string())),
            Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
            Some(_) => Err(ValidationError::invalid(key, "must be a string")),
        }
    }

    pub fn required_text(&self, key: &'static str) -> Result<String, ValidationError> {
        self.text(key)?.ok_or(ValidationError::Required(key))
    }

    /// For fields that may be omitted but never cleared: absent is `None`,
    /// null is a missing-field error.
    pub fn text_if_present(&self, key: &'static str) -> Result<Option<String>, ValidationError> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.required_text(key).map(Some)
    }

    /// `None` when absent, `Some(None)` when explicitly cleared.
    pub fn nullable_text(&self, key: &'static str) -> Result<Option<Option<String>>, ValidationError> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.text(key).map(Some)
    }

    pub fn number(&self, key: &'static str) -> Result<Option<f64>, ValidationError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(key, "must be a number")),
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(key, "must be a number")),
            Some(_) => Err(ValidationError::invalid(key, "must be a number")),
        }
    }

    pub fn nullable_number(&self, key: &'static str) -> Result<Option<Option<f64>>, ValidationError> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.number(key).map(Some)
    }

    pub fn timestamp(&self, key: &'static str) -> Result<Option<NaiveDateTime>, ValidationError> {
        match self.text(key)? {
            None => Ok(None),
            Some(text) => parse_timestamp(&text)
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(key, "is not a valid date")),
        }
    }

    pub fn nullable_timestamp(
        &self,
        key: &'static str,
    ) -> Result<Option<Option<NaiveDateTime>>, ValidationError> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.timestamp(key).map(Some)
    }

    pub fn uuid(&self, key: &'static str) -> Result<Option<Uuid>, ValidationError> {
        match self.text(key)? {
            None => Ok(None),
            Some(text) => Uuid::parse_str(&text)
                .map(Some)
                .map_err(|_| ValidationError::invalid(key, "must be a valid UUID")),
        }
    }

    pub fn required_uuid(&self, key: &'static str) -> Result<Uuid, ValidationError> {
        self.uuid(key)?.ok_or(ValidationError::Required(key))
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, the `datetime-local` input
/// format and plain dates (midnight).
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
