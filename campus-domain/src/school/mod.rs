pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// School实体
/// `image`保存存储引用：本地文件名或完整的远端URL，由当前启用的存储后端决定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
    pub image: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// 待校验的School输入
/// multipart表单里任何字段都可能缺失，因此全部为Option
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolDraft {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact: Option<String>,
    pub email_id: Option<String>,
}

impl SchoolDraft {
    /// 六个文本字段是否全部提供且非空白
    pub fn has_all_fields(&self) -> bool {
        [
            &self.name,
            &self.address,
            &self.city,
            &self.state,
            &self.contact,
            &self.email_id,
        ]
        .into_iter()
        .all(|field| field.as_deref().is_some_and(|value| !value.trim().is_empty()))
    }

    /// 结合已确定的图片引用生成待持久化记录
    pub fn into_new_school(self, image: String) -> NewSchool {
        NewSchool {
            name: self.name.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            contact: self.contact.unwrap_or_default(),
            email_id: self.email_id.unwrap_or_default(),
            image,
        }
    }
}

/// 待持久化的School记录，id与时间戳由Repository生成
#[derive(Debug, Clone)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
    pub image: String,
}

/// 传输层收到的图片上传
/// 字节只在内存中缓存，校验通过后才会写入存储
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}
