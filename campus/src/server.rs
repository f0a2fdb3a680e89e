use axum::{extract::DefaultBodyLimit, routing::get, Router};
use campus_domain::SchoolValidator;
use campus_infra::storage::ImageStorage;
use campus_infra::SchoolRepository;
use campus_service::{DefaultSchoolService, SchoolService};
use campus_web::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// 创建应用路由
pub fn create_router(
    state: AppState,
    images_dir: Option<PathBuf>,
    max_request_body_size: usize,
) -> Router {
    let mut router = Router::new()
        .route("/health", get(campus_web::health_check))
        .route("/api/health", get(campus_web::health_check))
        // School管理路由
        .route(
            "/api/schools",
            get(campus_web::list_schools).post(campus_web::add_school),
        )
        .route("/api/schools/search/:term", get(campus_web::search_schools))
        .route(
            "/api/schools/:id",
            get(campus_web::get_school)
                .put(campus_web::update_school)
                .delete(campus_web::delete_school),
        )
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", campus_web::ApiDoc::openapi()),
        );

    // 本地存储部署时静态提供图片目录
    if let Some(dir) = images_dir {
        router = router.nest_service("/schoolImages", ServeDir::new(dir));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_request_body_size)),
        )
        .with_state(state)
}

/// 初始化应用状态
pub fn init_app_state(
    repository: Arc<dyn SchoolRepository>,
    storage: Arc<dyn ImageStorage>,
    external_url: Option<String>,
) -> AppState {
    let school_service: Arc<dyn SchoolService> = Arc::new(DefaultSchoolService::new(
        repository,
        storage,
        SchoolValidator::new(),
    ));

    AppState {
        school_service,
        external_url,
    }
}
