#[cfg(test)]
mod tests;

use async_trait::async_trait;
use campus_domain::{ImageUpload, School, SchoolDraft, SchoolValidator};
use campus_infra::storage::{ImageStorage, RequestOrigin};
use campus_infra::{RepositoryError, SchoolRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// School服务错误，HTTP层据此映射状态码
#[derive(Debug, Error)]
pub enum SchoolError {
    /// 输入缺失或格式不合法 - 400
    #[error("{0}")]
    Validation(String),

    /// email_id唯一约束冲突 - 400
    #[error("Email already exists")]
    DuplicateEmail,

    /// 指定id的记录不存在 - 404
    #[error("School not found")]
    NotFound,

    /// 存储或数据库故障 - 500
    #[error("Internal server error")]
    Internal(String),
}

/// School服务trait
/// 读操作返回的记录image字段均已解析为可访问URL
#[async_trait]
pub trait SchoolService: Send + Sync {
    async fn add_school(
        &self,
        draft: SchoolDraft,
        image: Option<ImageUpload>,
        origin: &RequestOrigin,
    ) -> Result<School, SchoolError>;

    async fn update_school(
        &self,
        id: &str,
        draft: SchoolDraft,
        image: Option<ImageUpload>,
        origin: &RequestOrigin,
    ) -> Result<School, SchoolError>;

    async fn delete_school(&self, id: &str) -> Result<(), SchoolError>;

    async fn get_school(&self, id: &str, origin: &RequestOrigin) -> Result<School, SchoolError>;

    async fn list_schools(&self, origin: &RequestOrigin) -> Result<Vec<School>, SchoolError>;

    async fn search_schools(
        &self,
        term: &str,
        origin: &RequestOrigin,
    ) -> Result<Vec<School>, SchoolError>;
}

/// 默认School服务实现
/// 维护不变量：已持久化记录的image始终指向存储中存活的图片；
/// 被替换或删除的图片尽力清理，清理失败只记录日志
pub struct DefaultSchoolService {
    repository: Arc<dyn SchoolRepository>,
    storage: Arc<dyn ImageStorage>,
    validator: SchoolValidator,
}

impl DefaultSchoolService {
    pub fn new(
        repository: Arc<dyn SchoolRepository>,
        storage: Arc<dyn ImageStorage>,
        validator: SchoolValidator,
    ) -> Self {
        Self {
            repository,
            storage,
            validator,
        }
    }

    /// 尽力删除一张图片，失败不向上传播
    async fn discard_image(&self, reference: &str) {
        if reference.is_empty() {
            return;
        }
        if let Err(err) = self.storage.delete(reference).await {
            warn!(reference, error = %err, "failed to delete image");
        }
    }

    fn check(&self, draft: &SchoolDraft) -> Result<(), SchoolError> {
        let report = self.validator.validate(draft);
        if !report.is_valid {
            return Err(SchoolError::Validation(report.errors.join(", ")));
        }
        Ok(())
    }

    fn resolve(&self, mut school: School, origin: &RequestOrigin) -> School {
        school.image = self.storage.resolve_url(&school.image, origin);
        school
    }
}

fn internal(err: RepositoryError) -> SchoolError {
    SchoolError::Internal(err.to_string())
}

#[async_trait]
impl SchoolService for DefaultSchoolService {
    async fn add_school(
        &self,
        draft: SchoolDraft,
        image: Option<ImageUpload>,
        origin: &RequestOrigin,
    ) -> Result<School, SchoolError> {
        if !draft.has_all_fields() {
            return Err(SchoolError::Validation("All fields are required".to_string()));
        }
        self.check(&draft)?;

        let image = image
            .ok_or_else(|| SchoolError::Validation("School image is required".to_string()))?;

        // 图片先落存储，引用随记录一起持久化
        let reference = self
            .storage
            .store(&image.content, &image.filename)
            .await
            .map_err(|err| SchoolError::Internal(err.to_string()))?;

        match self.repository.insert(draft.into_new_school(reference.clone())).await {
            Ok(school) => Ok(self.resolve(school, origin)),
            Err(err) => {
                // 插入失败时回收刚存储的图片，避免孤儿
                self.discard_image(&reference).await;
                match err {
                    RepositoryError::DuplicateKey(_) => Err(SchoolError::DuplicateEmail),
                    other => Err(internal(other)),
                }
            }
        }
    }

    async fn update_school(
        &self,
        id: &str,
        draft: SchoolDraft,
        image: Option<ImageUpload>,
        origin: &RequestOrigin,
    ) -> Result<School, SchoolError> {
        self.check(&draft)?;

        let current = self
            .repository
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or(SchoolError::NotFound)?;

        // 提供了新图片则替换引用，否则沿用现有引用
        let (reference, replaced) = match image {
            Some(upload) => {
                self.discard_image(&current.image).await;
                let reference = self
                    .storage
                    .store(&upload.content, &upload.filename)
                    .await
                    .map_err(|err| SchoolError::Internal(err.to_string()))?;
                (reference, true)
            }
            None => (current.image.clone(), false),
        };

        match self
            .repository
            .update(id, draft.into_new_school(reference.clone()))
            .await
        {
            Ok(school) => Ok(self.resolve(school, origin)),
            Err(err) => {
                if replaced {
                    self.discard_image(&reference).await;
                }
                match err {
                    RepositoryError::DuplicateKey(_) => Err(SchoolError::DuplicateEmail),
                    RepositoryError::NotFound => Err(SchoolError::NotFound),
                    other => Err(internal(other)),
                }
            }
        }
    }

    async fn delete_school(&self, id: &str) -> Result<(), SchoolError> {
        if id.trim().is_empty() {
            return Err(SchoolError::Validation("School id is required".to_string()));
        }

        let school = self
            .repository
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or(SchoolError::NotFound)?;

        let deleted = self.repository.delete(id).await.map_err(internal)?;
        if !deleted {
            return Err(SchoolError::NotFound);
        }

        self.discard_image(&school.image).await;
        Ok(())
    }

    async fn get_school(&self, id: &str, origin: &RequestOrigin) -> Result<School, SchoolError> {
        let school = self
            .repository
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or(SchoolError::NotFound)?;

        Ok(self.resolve(school, origin))
    }

    async fn list_schools(&self, origin: &RequestOrigin) -> Result<Vec<School>, SchoolError> {
        let schools = self.repository.list().await.map_err(internal)?;
        Ok(schools
            .into_iter()
            .map(|school| self.resolve(school, origin))
            .collect())
    }

    async fn search_schools(
        &self,
        term: &str,
        origin: &RequestOrigin,
    ) -> Result<Vec<School>, SchoolError> {
        let schools = self.repository.search(term).await.map_err(internal)?;
        Ok(schools
            .into_iter()
            .map(|school| self.resolve(school, origin))
            .collect())
    }
}
