pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::recent::RecentUploads;
use crate::services::storage::StorageService;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::files::upload_file,
        handlers::files::list_files,
        handlers::files::recent_uploads,
        handlers::files::delete_file,
        handlers::health::health,
    ),
    components(
        schemas(
            handlers::files::UploadResponse,
            handlers::files::DeleteResponse,
            models::StoredObject,
            models::RecencyEntry,
        )
    ),
    tags(
        (name = "files", description = "Upload, listing and deletion endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageService>,
    pub recent: Arc<RecentUploads>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let storage = Arc::new(StorageService::new(
            config.uploads_dir.clone(),
            config.public_base_url.clone(),
            config.max_file_size,
        ));
        Self {
            storage,
            recent: Arc::new(RecentUploads::new()),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.config.uploads_dir.clone());

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/upload", post(handlers::files::upload_file))
        .route("/api/files", get(handlers::files::list_files))
        .route("/api/recent", get(handlers::files::recent_uploads))
        .route("/delete/:filename", delete(handlers::files::delete_file))
        .route("/health", get(handlers::health::health))
        .nest_service("/uploads", uploads)
        .with_state(state)
}
