use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::entities::project::{self, Entity as Project};
use crate::entities::{category, screen};
use crate::extract::FormPayload;
use crate::validation::{validated, ValidationError};

pub const DEFAULT_STATUS: &str = "draft";

#[derive(Debug, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub price: Option<f64>,
    #[validate(length(max = 255, message = "The status may not be greater than 255 characters."))]
    pub status: Option<String>,
    #[validate(length(max = 2048))]
    pub figma_url: Option<String>,
    #[validate(length(max = 2048))]
    pub docs_url: Option<String>,
    #[validate(length(max = 2048))]
    pub live_url: Option<String>,
    #[validate(length(max = 2048))]
    pub other_url: Option<String>,
}

impl NewProject {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        validated(Self {
            name: payload.required_text("name")?,
            description: payload.text("description")?,
            start_time: payload.timestamp("start_time")?,
            end_time: payload.timestamp("end_time")?,
            price: payload.number("price")?,
            status: payload.text("status")?,
            figma_url: payload.text("figma_url")?,
            docs_url: payload.text("docs_url")?,
            live_url: payload.text("live_url")?,
            other_url: payload.text("other_url")?,
        })
    }
}

/// Partial update. Outer `None` leaves a column alone, `Some(None)` clears it.
#[derive(Debug, Default, Validate)]
pub struct ProjectChanges {
    #[validate(length(min = 1, max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_time: Option<Option<NaiveDateTime>>,
    pub end_time: Option<Option<NaiveDateTime>>,
    pub price: Option<Option<f64>>,
    #[validate(length(max = 255, message = "The status may not be greater than 255 characters."))]
    pub status: Option<String>,
    #[validate(length(max = 2048))]
    pub figma_url: Option<Option<String>>,
    #[validate(length(max = 2048))]
    pub docs_url: Option<Option<String>>,
    #[validate(length(max = 2048))]
    pub live_url: Option<Option<String>>,
    #[validate(length(max = 2048))]
    pub other_url: Option<Option<String>>,
}

impl ProjectChanges {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        validated(Self {
            name: payload.text_if_present("name")?,
            description: payload.nullable_text("description")?,
            start_time: payload.nullable_timestamp("start_time")?,
            end_time: payload.nullable_timestamp("end_time")?,
            price: payload.nullable_number("price")?,
            // A cleared status keeps the stored one; the column is never null.
            status: payload.text("status")?,
            figma_url: payload.nullable_text("figma_url")?,
            docs_url: payload.nullable_text("docs_url")?,
            live_url: payload.nullable_text("live_url")?,
            other_url: payload.nullable_text("other_url")?,
        })
    }
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<project::Model>, DbErr> {
    Project::find()
        .order_by_asc(project::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<project::Model>, DbErr> {
    Project::find_by_id(id).one(db).await
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewProject,
    logo_url: Option<String>,
) -> Result<project::Model, DbErr> {
    let now = chrono::Utc::now().naive_utc();

    let project = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        logo_url: Set(logo_url),
        description: Set(input.description),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        price: Set(input.price),
        status: Set(input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        figma_url: Set(input.figma_url),
        docs_url: Set(input.docs_url),
        live_url: Set(input.live_url),
        other_url: Set(input.other_url),
        created_at: Set(now),
        updated_at: Set(now),
    };

    project.insert(db).await
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    existing: project::Model,
    changes: ProjectChanges,
    logo_url: Option<String>,
) -> Result<project::Model, DbErr> {
    let mut active_project = existing.into_active_model();

    if let Some(name) = changes.name {
        active_project.name = Set(name);
    }
    if let Some(description) = changes.description {
        active_project.description = Set(description);
    }
    if let Some(start_time) = changes.start_time {
        active_project.start_time = Set(start_time);
    }
    if let Some(end_time) = changes.end_time {
        active_project.end_time = Set(end_time);
    }
    if let Some(price) = changes.price {
        active_project.price = Set(price);
    }
    if let Some(status) = changes.status {
        active_project.status = Set(status);
    }
    if let Some(figma_url) = changes.figma_url {
        active_project.figma_url = Set(figma_url);
    }
    if let Some(docs_url) = changes.docs_url {
        active_project.docs_url = Set(docs_url);
    }
    if let Some(live_url) = changes.live_url {
        active_project.live_url = Set(live_url);
    }
    if let Some(other_url) = changes.other_url {
        active_project.other_url = Set(other_url);
    }
    if let Some(logo_url) = logo_url {
        active_project.logo_url = Set(Some(logo_url));
    }

    active_project.updated_at = Set(chrono::Utc::now().naive_utc());

    active_project.update(db).await
}

/// Deletes a project with its categories and screens in one transaction.
///
/// Returns `None` when the project does not exist, otherwise the stored
/// files (screen images and the logo) that no row references anymore.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Option<Vec<String>>, DbErr> {
    let txn = db.begin().await?;

    let Some(project) = Project::find_by_id(id).one(&txn).await? else {
        return Ok(None);
    };

    let image_urls: Vec<Option<String>> = screen::Entity::find()
        .filter(screen::Column::ProjectId.eq(id))
        .select_only()
        .column(screen::Column::ImageUrl)
        .into_tuple()
        .all(&txn)
        .await?;

    let screens = screen::Entity::delete_many()
        .filter(screen::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;
    let categories = category::Entity::delete_many()
        .filter(category::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;
    Project::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        project_id = %id,
        categories = categories.rows_affected,
        screens = screens.rows_affected,
        "deleted project"
    );

    let mut orphaned: Vec<String> = image_urls.into_iter().flatten().collect();
    orphaned.extend(project.logo_url);
    Ok(Some(orphaned))
}
