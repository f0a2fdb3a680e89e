use utoipa::OpenApi;

/// OpenAPI文档配置
#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "health", description = "健康检查端点"),
        (name = "schools", description = "学校记录管理端点"),
    ),
    info(
        title = "Campus API",
        description = "School Management API",
        version = "1.0.0"
    ),
    servers(
        (url = "http://localhost:5000", description = "本地开发服务器"),
    )
)]
pub struct ApiDoc;
