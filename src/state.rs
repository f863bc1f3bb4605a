use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::services::media::MediaStore;

#[derive(Clone, Copy, Debug)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub media: MediaStore,
    pub limits: UploadLimits,
}
