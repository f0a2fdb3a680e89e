use campus_domain::School;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// School 实体，对应数据库中的schools表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schools")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(36))")]
    pub id: String,

    pub name: String,

    pub address: String,

    pub city: String,

    pub state: String,

    #[sea_orm(column_type = "String(Some(20))")]
    pub contact: String,

    pub image: String,

    #[sea_orm(unique)]
    pub email_id: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for School {
    fn from(model: Model) -> Self {
        School {
            id: model.id,
            name: model.name,
            address: model.address,
            city: model.city,
            state: model.state,
            contact: model.contact,
            email_id: model.email_id,
            image: model.image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
