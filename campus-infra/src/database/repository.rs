use crate::database::school_entity::{self, Entity as SchoolEntity};
use async_trait::async_trait;
use campus_domain::{NewSchool, School};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use thiserror::Error;
use uuid::Uuid;

/// Repository层错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 唯一约束冲突（email_id重复）
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// 目标记录不存在
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),
}

/// SchoolRepository trait 定义School记录的数据访问操作
/// list与search均按创建时间倒序返回
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    async fn insert(&self, school: NewSchool) -> Result<School, RepositoryError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<School>, RepositoryError>;
    async fn update(&self, id: &str, school: NewSchool) -> Result<School, RepositoryError>;
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
    async fn list(&self) -> Result<Vec<School>, RepositoryError>;
    async fn search(&self, term: &str) -> Result<Vec<School>, RepositoryError>;
}

/// SeaOrmSchoolRepository 使用Sea-ORM实现的Repository
/// id为创建时生成的UUID v4
pub struct SeaOrmSchoolRepository {
    db: std::sync::Arc<DatabaseConnection>,
}

impl SeaOrmSchoolRepository {
    pub fn new(db: std::sync::Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn map_db_err(err: DbErr) -> RepositoryError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        RepositoryError::DuplicateKey(err.to_string())
    } else {
        RepositoryError::Database(err.to_string())
    }
}

/// 大小写不敏感的子串匹配条件：name/city/state/address任一命中
fn search_condition(term: &str) -> Condition {
    let needle = format!("%{}%", term.to_lowercase());
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(school_entity::Column::Name))).like(needle.clone()))
        .add(Expr::expr(Func::lower(Expr::col(school_entity::Column::City))).like(needle.clone()))
        .add(Expr::expr(Func::lower(Expr::col(school_entity::Column::State))).like(needle.clone()))
        .add(Expr::expr(Func::lower(Expr::col(school_entity::Column::Address))).like(needle))
}

#[async_trait]
impl SchoolRepository for SeaOrmSchoolRepository {
    async fn insert(&self, school: NewSchool) -> Result<School, RepositoryError> {
        let now = Utc::now();
        let active_model = school_entity::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(school.name),
            address: Set(school.address),
            city: Set(school.city),
            state: Set(school.state),
            contact: Set(school.contact),
            image: Set(school.image),
            email_id: Set(school.email_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = active_model.insert(self.db.as_ref()).await.map_err(map_db_err)?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<School>, RepositoryError> {
        let model = SchoolEntity::find_by_id(id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(model.map(School::from))
    }

    async fn update(&self, id: &str, school: NewSchool) -> Result<School, RepositoryError> {
        let model = SchoolEntity::find_by_id(id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .ok_or(RepositoryError::NotFound)?;

        // 整体替换字段集，createdAt保持不变
        let mut active_model: school_entity::ActiveModel = model.into();
        active_model.name = Set(school.name);
        active_model.address = Set(school.address);
        active_model.city = Set(school.city);
        active_model.state = Set(school.state);
        active_model.contact = Set(school.contact);
        active_model.image = Set(school.image);
        active_model.email_id = Set(school.email_id);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(self.db.as_ref()).await.map_err(map_db_err)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = SchoolEntity::delete_by_id(id.to_string())
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn list(&self) -> Result<Vec<School>, RepositoryError> {
        let models = SchoolEntity::find()
            .order_by_desc(school_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(School::from).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<School>, RepositoryError> {
        let models = SchoolEntity::find()
            .filter(search_condition(term))
            .order_by_desc(school_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(School::from).collect())
    }
}
