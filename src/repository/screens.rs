use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::entities::category;
use crate::entities::screen::{self, Entity as Screen, ScreenType};
use crate::error::AppError;
use crate::extract::FormPayload;
use crate::metadata::{MetadataPatch, ScreenMetadata};
use crate::validation::{validated, ValidationError};

#[derive(Debug, Validate)]
pub struct NewScreen {
    pub project_id: Uuid,
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "The title may not be greater than 255 characters."))]
    pub title: String,
    pub screen_type: ScreenType,
    pub purpose: Option<String>,
    pub metadata: ScreenMetadata,
}

impl NewScreen {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        validated(Self {
            project_id: payload.required_uuid("project_id")?,
            category_id: payload.required_uuid("category_id")?,
            title: payload.required_text("title")?,
            screen_type: screen_type(payload)?.unwrap_or_default(),
            purpose: payload.text("purpose")?,
            metadata: ScreenMetadata::from_submission(&payload.fields),
        })
    }
}

/// Partial update. A screen never moves to another project; a new category
/// must belong to the screen's current one.
#[derive(Debug, Default, Validate)]
pub struct ScreenChanges {
    #[validate(length(min = 1, max = 255, message = "The title may not be greater than 255 characters."))]
    pub title: Option<String>,
    pub screen_type: Option<ScreenType>,
    pub purpose: Option<Option<String>>,
    pub category_id: Option<Uuid>,
    pub metadata: MetadataPatch,
}

impl ScreenChanges {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        let category_id = if payload.contains("category_id") {
            Some(payload.required_uuid("category_id")?)
        } else {
            None
        };

        validated(Self {
            title: payload.text_if_present("title")?,
            screen_type: screen_type(payload)?,
            purpose: payload.nullable_text("purpose")?,
            category_id,
            metadata: MetadataPatch::from_submission(&payload.fields),
        })
    }
}

fn screen_type(payload: &FormPayload) -> Result<Option<ScreenType>, ValidationError> {
    payload
        .text("type")?
        .map(|raw| {
            ScreenType::parse(&raw.to_ascii_lowercase())
                .ok_or_else(|| ValidationError::invalid("type", "must be one of: web, mobile, other"))
        })
        .transpose()
}

/// A screen's category must be owned by the screen's project.
pub async fn ensure_category_in_project<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
    project_id: Uuid,
) -> Result<category::Model, AppError> {
    let category = category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if category.project_id != project_id {
        return Err(AppError::CategoryMismatch {
            category_id,
            category_project_id: category.project_id,
            project_id,
        });
    }

    Ok(category)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    project_id: Option<Uuid>,
) -> Result<Vec<(screen::Model, Option<category::Model>)>, DbErr> {
    let mut query = Screen::find();
    if let Some(project_id) = project_id {
        query = query.filter(screen::Column::ProjectId.eq(project_id));
    }

    query
        .order_by_asc(screen::Column::CreatedAt)
        .find_also_related(category::Entity)
        .all(db)
        .await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<screen::Model>, DbErr> {
    Screen::find_by_id(id).one(db).await
}

pub async fn find_with_category<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<(screen::Model, Option<category::Model>)>, DbErr> {
    Screen::find_by_id(id)
        .find_also_related(category::Entity)
        .one(db)
        .await
}

/// Inserts the screen. References must already be checked with
/// [`ensure_category_in_project`].
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewScreen,
    image_url: Option<String>,
) -> Result<screen::Model, DbErr> {
    let now = chrono::Utc::now().naive_utc();
    let metadata = input.metadata;

    let screen = screen::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(input.project_id),
        category_id: Set(input.category_id),
        title: Set(input.title),
        screen_type: Set(input.screen_type),
        image_url: Set(image_url),
        purpose: Set(input.purpose),
        actions: Set(metadata.actions),
        inputs: Set(metadata.inputs),
        static_content: Set(metadata.static_content),
        navigations: Set(metadata.navigations),
        states: Set(metadata.states),
        data: Set(metadata.data),
        created_at: Set(now),
        updated_at: Set(now),
    };

    screen.insert(db).await
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    existing: screen::Model,
    changes: ScreenChanges,
    image_url: Option<String>,
) -> Result<screen::Model, DbErr> {
    let mut active_screen = existing.into_active_model();

    if let Some(title) = changes.title {
        active_screen.title = Set(title);
    }
    if let Some(screen_type) = changes.screen_type {
        active_screen.screen_type = Set(screen_type);
    }
    if let Some(purpose) = changes.purpose {
        active_screen.purpose = Set(purpose);
    }
    if let Some(category_id) = changes.category_id {
        active_screen.category_id = Set(category_id);
    }
    if let Some(image_url) = image_url {
        active_screen.image_url = Set(Some(image_url));
    }

    let metadata = changes.metadata;
    if let Some(actions) = metadata.actions {
        active_screen.actions = Set(actions);
    }
    if let Some(inputs) = metadata.inputs {
        active_screen.inputs = Set(inputs);
    }
    if let Some(static_content) = metadata.static_content {
        active_screen.static_content = Set(static_content);
    }
    if let Some(navigations) = metadata.navigations {
        active_screen.navigations = Set(navigations);
    }
    if let Some(states) = metadata.states {
        active_screen.states = Set(states);
    }
    if let Some(data) = metadata.data {
        active_screen.data = Set(data);
    }

    active_screen.updated_at = Set(chrono::Utc::now().naive_utc());

    active_screen.update(db).await
}

/// Removes the row and returns it, so the caller can drop its stored image.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<screen::Model>, DbErr> {
    let Some(screen) = Screen::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    Screen::delete_by_id(id).exec(db).await?;
    Ok(Some(screen))
}
