use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::categories::CategoryResponse;
use super::projects::load_project;
use super::{pending_upload, store_pending};
use crate::entities::category;
use crate::entities::screen::{self, ScreenType};
use crate::error::AppError;
use crate::extract::{ApiPath, ApiQuery, FormPayload};
use crate::repository::screens::{self as repo, NewScreen, ScreenChanges};
use crate::response::ApiResponse;
use crate::services::media::MediaStore;
use crate::state::UploadLimits;

const IMAGE_FOLDER: &str = "screens";

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListScreensQuery {
    /// Only screens of this project.
    pub project_id: Option<Uuid>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScreenResponse {
    #[schema(value_type = String)]
    id: Uuid,
    #[schema(value_type = String)]
    project_id: Uuid,
    #[schema(value_type = String)]
    category_id: Uuid,
    title: String,
    #[serde(rename = "type")]
    screen_type: ScreenType,
    image_url: Option<String>,
    purpose: Option<String>,
    /// `[{label, event, target}]`
    #[schema(value_type = Object)]
    actions: Value,
    /// `[{label, type, required}]`
    #[schema(value_type = Object)]
    inputs: Value,
    /// `[string]`
    #[schema(value_type = Object)]
    static_content: Value,
    /// `[{label, target}]`
    #[schema(value_type = Object)]
    navigations: Value,
    /// `[string]`
    #[schema(value_type = Object)]
    states: Value,
    #[schema(value_type = Object)]
    data: Value,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
    category: Option<CategoryResponse>,
}

impl ScreenResponse {
    fn new(screen: screen::Model, category: Option<category::Model>) -> Self {
        ScreenResponse {
            id: screen.id,
            project_id: screen.project_id,
            category_id: screen.category_id,
            title: screen.title,
            screen_type: screen.screen_type,
            image_url: screen.image_url,
            purpose: screen.purpose,
            actions: screen.actions,
            inputs: screen.inputs,
            static_content: screen.static_content,
            navigations: screen.navigations,
            states: screen.states,
            data: screen.data,
            created_at: screen.created_at,
            updated_at: screen.updated_at,
            category: category.map(CategoryResponse::from),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/screens",
    params(
        ListScreensQuery
    ),
    responses(
        (status = 200, description = "Screens with their category", body = ApiResponse<Vec<ScreenResponse>>),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse)
    ),
    tag = "Screens"
)]
pub async fn list_screens(
    State(db): State<DatabaseConnection>,
    ApiQuery(query): ApiQuery<ListScreensQuery>,
) -> Result<Json<ApiResponse<Vec<ScreenResponse>>>, AppError> {
    if let Some(project_id) = query.project_id {
        load_project(&db, project_id).await?;
    }

    let screens = repo::list(&db, query.project_id).await?;

    let responses: Vec<ScreenResponse> = screens
        .into_iter()
        .map(|(screen, category)| ScreenResponse::new(screen, category))
        .collect();
    Ok(ApiResponse::ok("Screens retrieved successfully", responses))
}

#[utoipa::path(
    post,
    path = "/api/screens",
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "project_id, category_id and title (required), type (web|mobile|other), purpose, image (file), and the metadata fields actions, inputs, static_content, navigations, states, data as JSON strings. Unparsable metadata is stored empty."
    ),
    responses(
        (status = 201, description = "Screen created successfully", body = ApiResponse<ScreenResponse>),
        (status = 400, description = "Category belongs to another project", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or category not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    ),
    tag = "Screens"
)]
pub async fn create_screen(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    State(limits): State<UploadLimits>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<ApiResponse<ScreenResponse>>), AppError> {
    let input = NewScreen::from_payload(&payload)?;
    let image = pending_upload(&payload, "image", limits)?;

    tracing::debug!(
        project_id = %input.project_id,
        category_id = %input.category_id,
        title = %input.title,
        "screen creation request"
    );

    load_project(&db, input.project_id).await?;
    let category = repo::ensure_category_in_project(&db, input.category_id, input.project_id).await?;

    let image_url = store_pending(image, &media, IMAGE_FOLDER).await?;

    let created_screen = match repo::create(&db, input, image_url.clone()).await {
        Ok(screen) => screen,
        Err(e) => {
            media.remove_all(image_url).await;
            return Err(e.into());
        }
    };

    tracing::info!(screen_id = %created_screen.id, "screen created");
    Ok(ApiResponse::created(
        "Screen created successfully",
        ScreenResponse::new(created_screen, Some(category)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/screens/{id}",
    params(
        ("id" = String, Path, description = "Screen ID")
    ),
    responses(
        (status = 200, description = "Screen with its category", body = ApiResponse<ScreenResponse>),
        (status = 404, description = "Screen not found", body = crate::error::ErrorResponse)
    ),
    tag = "Screens"
)]
pub async fn get_screen(
    State(db): State<DatabaseConnection>,
    ApiPath(screen_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ScreenResponse>>, AppError> {
    let (screen, category) = repo::find_with_category(&db, screen_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Screen not found".to_string()))?;

    Ok(ApiResponse::ok(
        "Screen retrieved successfully",
        ScreenResponse::new(screen, category),
    ))
}

#[utoipa::path(
    put,
    path = "/api/screens/{id}",
    params(
        ("id" = String, Path, description = "Screen ID")
    ),
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "Any subset of title, type, purpose, category_id, image and the metadata fields. Omitted metadata fields keep their stored value. Also served on POST for form clients."
    ),
    responses(
        (status = 200, description = "Screen updated successfully", body = ApiResponse<ScreenResponse>),
        (status = 400, description = "Category belongs to another project", body = crate::error::ErrorResponse),
        (status = 404, description = "Screen or category not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    ),
    tag = "Screens"
)]
pub async fn update_screen(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    State(limits): State<UploadLimits>,
    ApiPath(screen_id): ApiPath<Uuid>,
    payload: FormPayload,
) -> Result<Json<ApiResponse<ScreenResponse>>, AppError> {
    let screen = repo::find(&db, screen_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Screen not found".to_string()))?;
    let changes = ScreenChanges::from_payload(&payload)?;
    let image = pending_upload(&payload, "image", limits)?;

    if let Some(category_id) = changes.category_id {
        repo::ensure_category_in_project(&db, category_id, screen.project_id).await?;
    }

    let previous_image = screen.image_url.clone();
    let image_url = store_pending(image, &media, IMAGE_FOLDER).await?;
    let replaced_image = image_url.is_some();

    let updated_screen = match repo::update(&db, screen, changes, image_url.clone()).await {
        Ok(screen) => screen,
        Err(e) => {
            media.remove_all(image_url).await;
            return Err(e.into());
        }
    };

    if replaced_image {
        media.remove_all(previous_image).await;
    }

    let (screen, category) = repo::find_with_category(&db, updated_screen.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Screen not found".to_string()))?;

    tracing::info!(screen_id = %screen.id, "screen updated");
    Ok(ApiResponse::ok(
        "Screen updated successfully",
        ScreenResponse::new(screen, category),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/screens/{id}",
    params(
        ("id" = String, Path, description = "Screen ID")
    ),
    responses(
        (status = 200, description = "Screen and its image deleted"),
        (status = 404, description = "Screen not found", body = crate::error::ErrorResponse)
    ),
    tag = "Screens"
)]
pub async fn delete_screen(
    State(db): State<DatabaseConnection>,
    State(media): State<MediaStore>,
    ApiPath(screen_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let screen = repo::delete(&db, screen_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Screen not found".to_string()))?;

    media.remove_all(screen.image_url).await;

    tracing::info!(screen_id = %screen.id, "screen deleted");
    Ok(ApiResponse::message("Screen deleted successfully"))
}
