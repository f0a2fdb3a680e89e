use super::{generate_image_id, ImageStorage, RequestOrigin};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Cloudinary托管存储实现
/// 引用即上传返回的secure_url，删除时从URL反推public_id
pub struct CloudinaryImageStorage {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStorage {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: folder.into(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        let payload = format!("{}{}", string_to_sign(params), self.api_secret);
        hex::encode(Sha256::digest(payload.as_bytes()))
    }

    /// 从引用URL反推服务端public_id：取末段路径、去扩展名、补folder前缀
    fn extract_public_id(&self, reference: &str) -> Option<String> {
        let filename = reference.rsplit('/').next()?;
        let stem = filename.split('.').next()?;
        if stem.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.folder, stem))
    }
}

/// 参数按key字典序拼接成待签名串
fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl ImageStorage for CloudinaryImageStorage {
    async fn store(&self, content: &[u8], original_filename: &str) -> Result<String> {
        let public_id = generate_image_id();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", self.folder.as_str()),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let file = Part::bytes(content.to_vec()).file_name(original_filename.to_string());
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("folder", self.folder.clone())
            .text("public_id", public_id)
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<UploadResponse>()
            .await?;

        Ok(response.secure_url)
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        let Some(public_id) = self.extract_public_id(reference) else {
            return Ok(());
        };

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<DestroyResponse>()
            .await?;

        // not found也算删除成功
        match response.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(anyhow!("cloudinary destroy failed: {}", other)),
        }
    }

    fn resolve_url(&self, reference: &str, _origin: &RequestOrigin) -> String {
        // 存储引用本身就是完整URL
        reference.to_string()
    }
}
