use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("This category does not belong to the specified project")]
    CategoryMismatch {
        category_id: Uuid,
        category_project_id: Uuid,
        project_id: Uuid,
    },
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    InternalServerError(String),
}

/// Body of every failed request.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object, nullable = true)]
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::CategoryMismatch { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Storage(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::CategoryMismatch {
                category_id,
                category_project_id,
                project_id,
            } => {
                tracing::warn!(
                    %category_id,
                    %category_project_id,
                    %project_id,
                    "category does not belong to project"
                );
                ErrorResponse {
                    success: false,
                    message: self.to_string(),
                    data: json!({
                        "category_id": category_id,
                        "category_project_id": category_project_id,
                        "project_id": project_id,
                    }),
                    error: None,
                }
            }
            AppError::Database(_) | AppError::Storage(_) | AppError::InternalServerError(_) => {
                tracing::error!(error = %self, "request failed");
                ErrorResponse {
                    success: false,
                    message: "Internal server error".to_string(),
                    data: Value::Null,
                    error: Some(self.to_string()),
                }
            }
            _ => ErrorResponse {
                success: false,
                message: self.to_string(),
                data: Value::Null,
                error: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
