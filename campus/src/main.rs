mod config;
mod error;
mod server;

use axum::serve;
use campus_infra::{
    database::DatabaseManager,
    storage::{CloudinaryImageStorage, ImageStorage, LocalImageStorage},
    MongoSchoolRepository, SchoolRepository, SeaOrmSchoolRepository,
};
use campus_migration::{Migrator, MigratorTrait};
use config::Config;
use error::{CampusError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting Campus application...");

    // 加载配置
    let config = Config::load()?;
    info!("Configuration loaded successfully");

    // 初始化数据库连接
    let mysql_url = config.database.mysql.as_ref().map(|c| c.url.as_str());
    let postgresql_url = config.database.postgresql.as_ref().map(|c| c.url.as_str());
    let mongodb_url = config.database.mongodb.as_ref().map(|c| c.url.as_str());

    let db_manager = Arc::new(
        DatabaseManager::new(mysql_url, postgresql_url, mongodb_url).await?
    );
    info!("Database connections established");

    // 选择记录存储后端：配置了关系型数据库则优先使用，否则回退MongoDB
    let repository: Arc<dyn SchoolRepository> = match db_manager.primary_db() {
        Ok(db) => {
            Migrator::up(db.as_ref(), None)
                .await
                .map_err(|e| CampusError::Database(e.to_string()))?;
            info!("Database migrations applied");
            Arc::new(SeaOrmSchoolRepository::new(db))
        }
        Err(_) => match (&config.database.mongodb, db_manager.mongodb()) {
            (Some(mongo_config), Some(client)) => {
                let repository = MongoSchoolRepository::new(client, &mongo_config.database);
                repository
                    .ensure_indexes()
                    .await
                    .map_err(|e| CampusError::Database(e.to_string()))?;
                info!("MongoDB indexes ensured");
                Arc::new(repository)
            }
            _ => return Err("No database connection available".into()),
        },
    };

    // 选择图片存储后端
    let storage_config = &config.campus.storage;
    let (storage, images_dir): (Arc<dyn ImageStorage>, Option<PathBuf>) =
        match storage_config.provider.as_str() {
            "cloudinary" => {
                let cloudinary = &storage_config.cloudinary;
                if cloudinary.cloud_name.is_empty()
                    || cloudinary.api_key.is_empty()
                    || cloudinary.api_secret.is_empty()
                {
                    return Err(CampusError::Storage(
                        "Cloudinary credentials are not configured".to_string(),
                    ));
                }
                let storage = CloudinaryImageStorage::new(
                    &cloudinary.cloud_name,
                    &cloudinary.api_key,
                    &cloudinary.api_secret,
                    &cloudinary.folder,
                );
                (Arc::new(storage), None)
            }
            _ => {
                let dir = storage_config.images_dir.clone();
                (Arc::new(LocalImageStorage::new(dir.clone())), Some(dir))
            }
        };
    info!("Image storage provider: {}", storage_config.provider);

    // 初始化应用状态
    let app_state = server::init_app_state(
        repository,
        storage,
        config.campus.external_url.clone(),
    );
    info!("Application state initialized");

    // 创建路由
    let app = server::create_router(
        app_state,
        images_dir,
        config.server.max_request_body_size,
    );
    info!("Router created");

    // 启动HTTP服务器
    let addr = format!("{}:{}", config.server.host, config.server.port)
        .parse::<std::net::SocketAddr>()
        .map_err(|e| format!("Invalid address: {}", e))?;

    info!("Campus application started successfully");
    info!("Server listening on {}", addr);
    info!(
        "Health check available at: http://localhost:{}/api/health",
        config.server.port
    );

    let listener = TcpListener::bind(&addr).await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}

/// 等待SIGINT或SIGTERM，收到后优雅停机
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing server...");
}
