mod categories;
mod home;
mod projects;
mod screens;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::AppError;
use crate::extract::{FormPayload, UploadedFile};
use crate::services::media::MediaStore;
use crate::state::{AppState, UploadLimits};
use crate::utils::images::{inspect_upload, CheckedImage};
use crate::validation::ValidationError;

/// Room for the text fields sent next to a maximum-size upload.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        projects::list_projects,
        projects::create_project,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        categories::list_project_categories,
        categories::create_project_category,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        screens::list_screens,
        screens::create_screen,
        screens::get_screen,
        screens::update_screen,
        screens::delete_screen,
    ),
    components(
        schemas(
            projects::ProjectResponse,
            categories::CategoryResponse,
            screens::ScreenResponse,
            crate::entities::screen::ScreenType,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Projects", description = "Projects and their descriptive links"),
        (name = "Categories", description = "Groupings of screens within a project"),
        (name = "Screens", description = "Documented screens with structured metadata")
    ),
    info(
        title = "Screen Catalog API",
        version = "0.1.0",
        description = "Catalog of projects, screen categories and per-screen design metadata",
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState, cors_origins: &[String]) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let api_routes = Router::new()
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .post(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/{id}/categories",
            get(categories::list_project_categories).post(categories::create_project_category),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/screens",
            get(screens::list_screens).post(screens::create_screen),
        )
        .route(
            "/screens/{id}",
            get(screens::get_screen)
                .put(screens::update_screen)
                .post(screens::update_screen)
                .delete(screens::delete_screen),
        )
        .layer(DefaultBodyLimit::max(body_limit(state.limits)));

    let mut app_routes = Router::new()
        .route("/", get(home::root))
        .nest("/api", api_routes);

    if let Some(root) = state.media.local_root() {
        app_routes = app_routes.nest_service("/storage", ServeDir::new(root));
    }

    Router::new()
        .merge(swagger_router)
        .merge(app_routes.with_state(state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn body_limit(limits: UploadLimits) -> usize {
    limits.max_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// An uploaded image that passed inspection but is not stored yet.
struct PendingUpload<'a> {
    file: &'a UploadedFile,
    image: CheckedImage,
}

fn pending_upload<'a>(
    payload: &'a FormPayload,
    field: &'static str,
    limits: UploadLimits,
) -> Result<Option<PendingUpload<'a>>, ValidationError> {
    payload
        .file(field)
        .map(|file| {
            inspect_upload(file, field, limits.max_bytes).map(|image| PendingUpload { file, image })
        })
        .transpose()
}

async fn store_pending(
    pending: Option<PendingUpload<'_>>,
    media: &MediaStore,
    folder: &str,
) -> Result<Option<String>, AppError> {
    match pending {
        Some(upload) => media.store(folder, upload.file, upload.image).await.map(Some),
        None => Ok(None),
    }
}
