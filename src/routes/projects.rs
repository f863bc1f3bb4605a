use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use super::{pending_upload, store_pending};
use crate::entities::project;
use crate::error::AppError;
use crate::extract::{ApiPath, FormPayload};
use crate::repository::projects::{self as repo, NewProject, ProjectChanges};
use crate::response::ApiResponse;
use crate::services::media::MediaStore;
use crate::state::UploadLimits;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    #[schema(value_type = String)]
    id: Uuid,
    name: String,
    description: Option<String>,
    start_time: Option<chrono::NaiveDateTime>,
    end_time: Option<chrono::NaiveDateTime>,
    price: Option<f64>,
    status: String,
    logo_url: Option<String>,
    figma_url: Option<String>,
    docs_url: Option<String>,
    live_url: Option<String>,
    other_url: Option<String>,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl From<project::Model> for ProjectResponse {
    fn from(project: project::Model) -> Self {
        ProjectResponse {
            id: project.id,
            name: project.name,
            description: project.description,
            start_time: project.start_time,
            end_time: project.end_time,
            price: project.price,
            status: project.status,
            logo_url: project.logo_url,
            figma_url: project.figma_url,
            docs_url: project.docs_url,
            live_url: project.live_url,
            other_url: project.other_url,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

pub(super) async fn load_project(
    db: &DatabaseConnection,
    project_id: Uuid,
) -> Result<project::Model, AppError> {
    repo::find(db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "All projects", body = ApiResponse<Vec<ProjectResponse>>),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(db): State<DatabaseConnection>,
) -> Result<Json<ApiResponse<Vec<ProjectResponse>>>, AppError> {
    let projects = repo::list(&db).await?;

    let responses: Vec<ProjectResponse> = projects.into_iter().map(ProjectResponse::from).collect();
    Ok(ApiResponse::ok("Projects retrieved successfully", responses))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "name (required), description, start_time, end_time, price, status, figma_url, docs_url, live_url, other_url, logo (image file). JSON bodies with the same fields are accepted too."
    ),
    responses(
        (status = 201, description = "Project created successfully", body = ApiResponse<ProjectResponse>),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    State(limits): State<UploadLimits>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<ApiResponse<ProjectResponse>>), AppError> {
    let input = NewProject::from_payload(&payload)?;
    let logo = pending_upload(&payload, "logo", limits)?;
    let logo_url = store_pending(logo, &media, "logos").await?;

    let created_project = match repo::create(&db, input, logo_url.clone()).await {
        Ok(project) => project,
        Err(e) => {
            media.remove_all(logo_url).await;
            return Err(e.into());
        }
    };

    tracing::info!(project_id = %created_project.id, name = %created_project.name, "project created");
    Ok(ApiResponse::created(
        "Project created successfully",
        ProjectResponse::from(created_project),
    ))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project details", body = ApiResponse<ProjectResponse>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn get_project(
    State(db): State<DatabaseConnection>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ProjectResponse>>, AppError> {
    let project = load_project(&db, project_id).await?;

    Ok(ApiResponse::ok(
        "Project retrieved successfully",
        ProjectResponse::from(project),
    ))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "Any subset of the create fields. Blank values clear optional fields; a new logo replaces the stored one. Also served on POST for form clients."
    ),
    responses(
        (status = 200, description = "Project updated successfully", body = ApiResponse<ProjectResponse>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    State(limits): State<UploadLimits>,
    ApiPath(project_id): ApiPath<Uuid>,
    payload: FormPayload,
) -> Result<Json<ApiResponse<ProjectResponse>>, AppError> {
    let project = load_project(&db, project_id).await?;
    let changes = ProjectChanges::from_payload(&payload)?;
    let logo = pending_upload(&payload, "logo", limits)?;

    let previous_logo = project.logo_url.clone();
    let logo_url = store_pending(logo, &media, "logos").await?;
    let replaced_logo = logo_url.is_some();

    let updated_project = match repo::update(&db, project, changes, logo_url.clone()).await {
        Ok(project) => project,
        Err(e) => {
            media.remove_all(logo_url).await;
            return Err(e.into());
        }
    };

    if replaced_logo {
        media.remove_all(previous_logo).await;
    }

    tracing::info!(project_id = %updated_project.id, "project updated");
    Ok(ApiResponse::ok(
        "Project updated successfully",
        ProjectResponse::from(updated_project),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project, its categories and screens deleted"),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let orphaned = repo::delete(&db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    media.remove_all(orphaned).await;

    Ok(ApiResponse::message("Project deleted successfully"))
}
