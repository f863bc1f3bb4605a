use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::projects::{load_project, ProjectResponse};
use crate::entities::{category, project};
use crate::error::AppError;
use crate::extract::{ApiPath, ApiQuery, FormPayload};
use crate::repository::categories::{self as repo, CategoryChanges, NewCategory};
use crate::response::ApiResponse;
use crate::services::media::MediaStore;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListCategoriesQuery {
    /// Only categories of this project.
    pub project_id: Option<Uuid>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    #[schema(value_type = String)]
    id: Uuid,
    #[schema(value_type = String)]
    project_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectResponse>,
}

impl From<category::Model> for CategoryResponse {
    fn from(category: category::Model) -> Self {
        CategoryResponse {
            id: category.id,
            project_id: category.project_id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
            project: None,
        }
    }
}

impl CategoryResponse {
    fn with_project(category: category::Model, project: Option<project::Model>) -> Self {
        CategoryResponse {
            project: project.map(ProjectResponse::from),
            ..CategoryResponse::from(category)
        }
    }
}

async fn categories_of(
    db: &DatabaseConnection,
    project_id: Option<Uuid>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, AppError> {
    if let Some(project_id) = project_id {
        load_project(db, project_id).await?;
    }

    let categories = repo::list(db, project_id).await?;

    let responses: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from).collect();
    Ok(ApiResponse::ok("Categories retrieved successfully", responses))
}

async fn insert_category(
    db: &DatabaseConnection,
    input: NewCategory,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), AppError> {
    load_project(db, input.project_id).await?;

    let created_category = repo::create(db, input).await?;

    tracing::info!(
        category_id = %created_category.id,
        project_id = %created_category.project_id,
        "category created"
    );
    Ok(ApiResponse::created(
        "Category created successfully",
        CategoryResponse::from(created_category),
    ))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/categories",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Categories of the project", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_project_categories(
    State(db): State<DatabaseConnection>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, AppError> {
    categories_of(&db, Some(project_id)).await
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/categories",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    request_body(
        content = Vec<u8>,
        content_type = "application/json",
        description = "name (required), description"
    ),
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_project_category(
    State(db): State<DatabaseConnection>,
    ApiPath(project_id): ApiPath<Uuid>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), AppError> {
    let input = NewCategory::from_payload(&payload, Some(project_id))?;
    insert_category(&db, input).await
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ListCategoriesQuery
    ),
    responses(
        (status = 200, description = "Categories, optionally of one project", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(db): State<DatabaseConnection>,
    ApiQuery(query): ApiQuery<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, AppError> {
    categories_of(&db, query.project_id).await
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body(
        content = Vec<u8>,
        content_type = "application/json",
        description = "project_id (required), name (required), description"
    ),
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(db): State<DatabaseConnection>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), AppError> {
    let input = NewCategory::from_payload(&payload, None)?;
    insert_category(&db, input).await
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category with its project", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(db): State<DatabaseConnection>,
    ApiPath(category_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponse>>, AppError> {
    let (category, project) = repo::find_with_project(&db, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(ApiResponse::ok(
        "Category retrieved successfully",
        CategoryResponse::with_project(category, project),
    ))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    request_body(
        content = Vec<u8>,
        content_type = "application/json",
        description = "name, description"
    ),
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(db): State<DatabaseConnection>,
    ApiPath(category_id): ApiPath<Uuid>,
    payload: FormPayload,
) -> Result<Json<ApiResponse<CategoryResponse>>, AppError> {
    let category = repo::find(&db, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    let changes = CategoryChanges::from_payload(&payload)?;

    let updated_category = repo::update(&db, category, changes).await?;

    tracing::info!(category_id = %updated_category.id, "category updated");
    Ok(ApiResponse::ok(
        "Category updated successfully",
        CategoryResponse::from(updated_category),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category and its screens deleted"),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    ApiPath(category_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let orphaned = repo::delete(&db, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    media.remove_all(orphaned).await;

    Ok(ApiResponse::message("Category deleted successfully"))
}
