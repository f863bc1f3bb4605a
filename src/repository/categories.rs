use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::entities::category::{self, Entity as Category};
use crate::entities::{project, screen};
use crate::extract::FormPayload;
use crate::validation::{validated, ValidationError};

#[derive(Debug, Validate)]
pub struct NewCategory {
    pub project_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    /// `project_id` comes from the route for nested creation, from the body otherwise.
    pub fn from_payload(
        payload: &FormPayload,
        project_id: Option<Uuid>,
    ) -> Result<Self, ValidationError> {
        let project_id = match project_id {
            Some(id) => id,
            None => payload.required_uuid("project_id")?,
        };

        validated(Self {
            project_id,
            name: payload.required_text("name")?,
            description: payload.text("description")?,
        })
    }
}

#[derive(Debug, Default, Validate)]
pub struct CategoryChanges {
    #[validate(length(min = 1, max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl CategoryChanges {
    pub fn from_payload(payload: &FormPayload) -> Result<Self, ValidationError> {
        validated(Self {
            name: payload.text_if_present("name")?,
            description: payload.nullable_text("description")?,
        })
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    project_id: Option<Uuid>,
) -> Result<Vec<category::Model>, DbErr> {
    let mut query = Category::find();
    if let Some(project_id) = project_id {
        query = query.filter(category::Column::ProjectId.eq(project_id));
    }

    query
        .order_by_asc(category::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<category::Model>, DbErr> {
    Category::find_by_id(id).one(db).await
}

pub async fn find_with_project<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<(category::Model, Option<project::Model>)>, DbErr> {
    Category::find_by_id(id)
        .find_also_related(project::Entity)
        .one(db)
        .await
}

/// Inserts the category. The caller has checked that the project exists.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewCategory,
) -> Result<category::Model, DbErr> {
    let now = chrono::Utc::now().naive_utc();

    let category = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(input.project_id),
        name: Set(input.name),
        description: Set(input.description),
        created_at: Set(now),
        updated_at: Set(now),
    };

    category.insert(db).await
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    existing: category::Model,
    changes: CategoryChanges,
) -> Result<category::Model, DbErr> {
    let mut active_category = existing.into_active_model();

    if let Some(name) = changes.name {
        active_category.name = Set(name);
    }
    if let Some(description) = changes.description {
        active_category.description = Set(description);
    }

    active_category.updated_at = Set(chrono::Utc::now().naive_utc());

    active_category.update(db).await
}

/// Deletes a category and its screens. Returns `None` when the category does
/// not exist, otherwise the images of the removed screens.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Option<Vec<String>>, DbErr> {
    let txn = db.begin().await?;

    if Category::find_by_id(id).one(&txn).await?.is_none() {
        return Ok(None);
    }

    let image_urls: Vec<Option<String>> = screen::Entity::find()
        .filter(screen::Column::CategoryId.eq(id))
        .select_only()
        .column(screen::Column::ImageUrl)
        .into_tuple()
        .all(&txn)
        .await?;

    let screens = screen::Entity::delete_many()
        .filter(screen::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    Category::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(category_id = %id, screens = screens.rows_affected, "deleted category");

    Ok(Some(image_urls.into_iter().flatten().collect()))
}
