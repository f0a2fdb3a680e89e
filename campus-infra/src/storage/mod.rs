pub mod cloudinary;
pub mod local;

pub use cloudinary::CloudinaryImageStorage;
pub use local::LocalImageStorage;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

/// 请求来源，本地存储用它拼接图片的完整URL
#[derive(Debug, Clone)]
pub struct RequestOrigin {
    base_url: String,
}

impl RequestOrigin {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// 图片存储trait
/// 部署时只启用一个实现，Service只依赖此接口
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// 保存图片字节，返回存储引用
    /// 本地实现返回生成的文件名，远端实现返回完整URL
    async fn store(&self, content: &[u8], original_filename: &str) -> Result<String>;

    /// 按引用删除图片，本地文件不存在不算错误
    async fn delete(&self, reference: &str) -> Result<()>;

    /// 将存储引用解析为客户端可访问的URL
    fn resolve_url(&self, reference: &str, origin: &RequestOrigin) -> String;
}

/// 生成抗碰撞的图片标识：时间戳 + 随机后缀
pub(crate) fn generate_image_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("school-{}-{}", millis, suffix)
}
