pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::PortalConfig;
use crate::services::category_service::CategoryService;
use crate::services::material_service::MaterialService;
use crate::services::storage::StorageService;
use crate::services::tutor::{CompletionClient, TutorService};
use crate::services::view_cache::ViewCache;
use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::catalog::list_classes,
        api::handlers::catalog::class_materials,
        api::handlers::catalog::category_forest,
        api::handlers::tutor::ask_ai,
        api::handlers::auth::login,
        api::handlers::materials::list_materials,
        api::handlers::materials::get_material,
        api::handlers::materials::upload_material,
        api::handlers::materials::update_material,
        api::handlers::materials::delete_material,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::catalog::ClassInfo,
            api::handlers::catalog::ClassPageResponse,
            api::handlers::tutor::AskRequest,
            api::handlers::tutor::AskResponse,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::LoginResponse,
            api::handlers::materials::MaterialMutationResponse,
            api::handlers::materials::DeleteMaterialResponse,
            api::handlers::categories::CategoryOption,
            api::handlers::categories::AdminCategoriesResponse,
            api::handlers::categories::CategoryMutationResponse,
            api::handlers::categories::SuccessResponse,
            services::category_tree::CategoryNode,
            services::category_service::CategoryInput,
            services::category_service::CategoryWithCount,
            services::material_service::MaterialUpdate,
            services::tutor::ChatTurn,
            services::tutor::ChatRole,
            models::MaterialResponse,
            models::CategoryResponse,
            models::FileType,
        )
    ),
    tags(
        (name = "catalog", description = "Public class and category browsing"),
        (name = "tutor", description = "AI tutor"),
        (name = "admin", description = "Material and category administration"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub material_service: Arc<MaterialService>,
    pub category_service: Arc<CategoryService>,
    pub tutor: Arc<TutorService>,
    pub cache: Arc<ViewCache>,
    pub config: PortalConfig,
}

impl AppState {
    /// Wires the services around one shared view cache.
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageService>,
        completion: Arc<dyn CompletionClient>,
        config: PortalConfig,
    ) -> Self {
        let cache = Arc::new(ViewCache::new());
        let material_service = Arc::new(MaterialService::new(
            db.clone(),
            storage.clone(),
            cache.clone(),
            config.clone(),
        ));
        let category_service = Arc::new(CategoryService::new(db.clone(), cache.clone()));

        Self {
            db,
            storage,
            material_service,
            category_service,
            tutor: Arc::new(TutorService::new(completion)),
            cache,
            config,
        }
    }
}

fn cors_layer(config: &PortalConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

pub fn create_app(state: AppState) -> Router {
    let upload_limit = state.config.max_file_size + 10 * 1024 * 1024; // multipart overhead

    let admin = Router::new()
        .route(
            "/admin/materials",
            get(api::handlers::materials::list_materials)
                .post(api::handlers::materials::upload_material),
        )
        .route(
            "/admin/materials/:id",
            get(api::handlers::materials::get_material)
                .put(api::handlers::materials::update_material)
                .delete(api::handlers::materials::delete_material),
        )
        .route(
            "/admin/categories",
            get(api::handlers::categories::list_categories)
                .post(api::handlers::categories::create_category),
        )
        .route(
            "/admin/categories/:id",
            axum::routing::put(api::handlers::categories::update_category)
                .delete(api::handlers::categories::delete_category),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::admin_auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/classes", get(api::handlers::catalog::list_classes))
        .route(
            "/class/:class/materials",
            get(api::handlers::catalog::class_materials),
        )
        .route("/categories", get(api::handlers::catalog::category_forest))
        .route("/ask-ai", post(api::handlers::tutor::ask_ai))
        .route("/admin/login", post(api::handlers::auth::login))
        .merge(admin)
        .layer(axum::extract::DefaultBodyLimit::max(upload_limit))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
