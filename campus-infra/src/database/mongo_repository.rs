use crate::database::repository::{RepositoryError, SchoolRepository};
use async_trait::async_trait;
use campus_domain::{NewSchool, School};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client as MongoClient, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// schools集合中的文档，字段名沿用对外JSON格式
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchoolDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    address: String,
    city: String,
    state: String,
    contact: String,
    image: String,
    email_id: String,
    #[serde(rename = "createdAt")]
    created_at: BsonDateTime,
    #[serde(rename = "updatedAt")]
    updated_at: BsonDateTime,
}

impl SchoolDocument {
    fn into_school(self) -> School {
        School {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            contact: self.contact,
            email_id: self.email_id,
            image: self.image,
            created_at: to_chrono(self.created_at),
            updated_at: to_chrono(self.updated_at),
        }
    }
}

fn to_chrono(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        // findAndModify把重复键作为命令错误返回
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

fn map_mongo_err(err: mongodb::error::Error) -> RepositoryError {
    if is_duplicate_key(&err) {
        RepositoryError::DuplicateKey(err.to_string())
    } else {
        RepositoryError::Database(err.to_string())
    }
}

/// MongoSchoolRepository 使用MongoDB实现的Repository
/// 语法非法的id一律视为不存在，而不是报错
pub struct MongoSchoolRepository {
    collection: Collection<SchoolDocument>,
}

impl MongoSchoolRepository {
    pub fn new(client: Arc<MongoClient>, database: &str) -> Self {
        let collection = client.database(database).collection("schools");
        Self { collection }
    }

    /// 确保email_id上的唯一索引存在，进程启动时调用一次
    pub async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        let index = IndexModel::builder()
            .keys(doc! { "email_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SchoolRepository for MongoSchoolRepository {
    async fn insert(&self, school: NewSchool) -> Result<School, RepositoryError> {
        let now = BsonDateTime::now();
        let document = SchoolDocument {
            id: None,
            name: school.name,
            address: school.address,
            city: school.city,
            state: school.state,
            contact: school.contact,
            image: school.image,
            email_id: school.email_id,
            created_at: now,
            updated_at: now,
        };

        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(map_mongo_err)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::Database("missing inserted id".to_string()))?;

        let mut school = document.into_school();
        school.id = id.to_hex();
        Ok(school)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<School>, RepositoryError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let document = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(map_mongo_err)?;

        Ok(document.map(SchoolDocument::into_school))
    }

    async fn update(&self, id: &str, school: NewSchool) -> Result<School, RepositoryError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Err(RepositoryError::NotFound);
        };

        let update = doc! {
            "$set": {
                "name": school.name,
                "address": school.address,
                "city": school.city,
                "state": school.state,
                "contact": school.contact,
                "image": school.image,
                "email_id": school.email_id,
                "updatedAt": BsonDateTime::now(),
            }
        };

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_err)?;

        updated
            .map(SchoolDocument::into_school)
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };

        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(map_mongo_err)?;

        Ok(result.deleted_count > 0)
    }

    async fn list(&self) -> Result<Vec<School>, RepositoryError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(map_mongo_err)?;

        let documents: Vec<SchoolDocument> = cursor.try_collect().await.map_err(map_mongo_err)?;
        Ok(documents.into_iter().map(SchoolDocument::into_school).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<School>, RepositoryError> {
        let filter = doc! {
            "$or": [
                { "name": { "$regex": term, "$options": "i" } },
                { "city": { "$regex": term, "$options": "i" } },
                { "state": { "$regex": term, "$options": "i" } },
                { "address": { "$regex": term, "$options": "i" } },
            ]
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(map_mongo_err)?;

        let documents: Vec<SchoolDocument> = cursor.try_collect().await.map_err(map_mongo_err)?;
        Ok(documents.into_iter().map(SchoolDocument::into_school).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_into_school() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let now = BsonDateTime::now();
        let document = SchoolDocument {
            id: Some(oid),
            name: "Springdale Public School".to_string(),
            address: "42 Lake View Road, Sector 9".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            contact: "9123456789".to_string(),
            image: "school-1-1.jpg".to_string(),
            email_id: "info@springdale.edu".to_string(),
            created_at: now,
            updated_at: now,
        };

        let school = document.into_school();
        assert_eq!(school.id, "507f1f77bcf86cd799439011");
        assert_eq!(school.email_id, "info@springdale.edu");
        assert_eq!(school.created_at.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_invalid_object_id_means_absent() {
        assert!(ObjectId::parse_str("not-an-object-id").is_err());
    }
}
