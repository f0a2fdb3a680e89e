use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub campus: CampusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub max_request_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
            max_request_body_size: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub mysql: Option<DatabaseConnectionConfig>,
    pub postgresql: Option<DatabaseConnectionConfig>,
    pub mongodb: Option<MongoDBConfig>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            mysql: None,
            postgresql: None,
            mongodb: Some(MongoDBConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConnectionConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDBConfig {
    pub url: String,
    pub database: String,
}

impl Default for MongoDBConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "campus".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusConfig {
    pub work_dir: PathBuf,
    /// 对外地址，设置后本地图片URL不再按请求头推断
    pub external_url: Option<String>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 图片存储后端："local" 或 "cloudinary"
    pub provider: String,
    pub images_dir: PathBuf,
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "school-images".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let work_dir = home_dir.join(".campus");

        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            campus: CampusConfig {
                work_dir: work_dir.clone(),
                external_url: None,
                storage: StorageConfig {
                    provider: "local".to_string(),
                    images_dir: work_dir.join("schoolImages"),
                    cloudinary: CloudinaryConfig::default(),
                },
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let work_dir = home_dir.join(".campus");
        let config_path = work_dir.join("campus.toml");

        // 如果存在.env文件，加载它
        let _ = dotenv::dotenv();

        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("campus.toml").required(false))
            .add_source(config::File::from(config_path.as_path()).required(false))
            .add_source(config::Environment::with_prefix("CAMPUS").separator("__"));

        let config = builder.build()?;
        config.try_deserialize()
    }
}
