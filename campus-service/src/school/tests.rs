use super::*;
use async_trait::async_trait;
use campus_domain::{ImageUpload, NewSchool, School, SchoolDraft, SchoolValidator};
use campus_infra::storage::{ImageStorage, RequestOrigin};
use campus_infra::{RepositoryError, SchoolRepository};
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// 内存Repository，行为对齐真实实现：email唯一、倒序返回
#[derive(Default)]
struct InMemoryRepository {
    schools: Mutex<Vec<School>>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    fn check_duplicate(
        schools: &[School],
        email_id: &str,
        skip_id: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let duplicate = schools.iter().any(|school| {
            school.email_id == email_id && skip_id.map_or(true, |id| school.id != id)
        });
        if duplicate {
            return Err(RepositoryError::DuplicateKey(email_id.to_string()));
        }
        Ok(())
    }

    fn newest_first(mut schools: Vec<School>) -> Vec<School> {
        schools.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        schools
    }
}

#[async_trait]
impl SchoolRepository for InMemoryRepository {
    async fn insert(&self, school: NewSchool) -> Result<School, RepositoryError> {
        let mut schools = self.schools.lock().unwrap();
        Self::check_duplicate(&schools, &school.email_id, None)?;

        let sequence = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + Duration::seconds(sequence as i64);
        let record = School {
            id: format!("school-{}", sequence),
            name: school.name,
            address: school.address,
            city: school.city,
            state: school.state,
            contact: school.contact,
            email_id: school.email_id,
            image: school.image,
            created_at,
            updated_at: created_at,
        };
        schools.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<School>, RepositoryError> {
        let schools = self.schools.lock().unwrap();
        Ok(schools.iter().find(|school| school.id == id).cloned())
    }

    async fn update(&self, id: &str, school: NewSchool) -> Result<School, RepositoryError> {
        let mut schools = self.schools.lock().unwrap();
        Self::check_duplicate(&schools, &school.email_id, Some(id))?;

        let record = schools
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.name = school.name;
        record.address = school.address;
        record.city = school.city;
        record.state = school.state;
        record.contact = school.contact;
        record.email_id = school.email_id;
        record.image = school.image;
        record.updated_at = record.updated_at + Duration::seconds(1);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut schools = self.schools.lock().unwrap();
        let before = schools.len();
        schools.retain(|school| school.id != id);
        Ok(schools.len() < before)
    }

    async fn list(&self) -> Result<Vec<School>, RepositoryError> {
        let schools = self.schools.lock().unwrap();
        Ok(Self::newest_first(schools.clone()))
    }

    async fn search(&self, term: &str) -> Result<Vec<School>, RepositoryError> {
        let needle = term.to_lowercase();
        let schools = self.schools.lock().unwrap();
        let matches = schools
            .iter()
            .filter(|school| {
                [&school.name, &school.city, &school.state, &school.address]
                    .into_iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(Self::newest_first(matches))
    }
}

/// 内存图片存储，记录当前存活的引用
#[derive(Default)]
struct InMemoryStorage {
    stored: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    fail_delete: AtomicBool,
}

impl InMemoryStorage {
    fn contains(&self, reference: &str) -> bool {
        self.stored.lock().unwrap().contains(reference)
    }

    fn count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStorage for InMemoryStorage {
    async fn store(&self, _content: &[u8], original_filename: &str) -> anyhow::Result<String> {
        let sequence = self.next_id.fetch_add(1, Ordering::SeqCst);
        let reference = format!("img-{}-{}", sequence, original_filename);
        self.stored.lock().unwrap().insert(reference.clone());
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> anyhow::Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        self.stored.lock().unwrap().remove(reference);
        Ok(())
    }

    fn resolve_url(&self, reference: &str, origin: &RequestOrigin) -> String {
        format!("{}/schoolImages/{}", origin.base_url(), reference)
    }
}

struct Fixture {
    service: DefaultSchoolService,
    repository: Arc<InMemoryRepository>,
    storage: Arc<InMemoryStorage>,
}

fn fixture() -> Fixture {
    let repository = Arc::new(InMemoryRepository::default());
    let storage = Arc::new(InMemoryStorage::default());
    let service = DefaultSchoolService::new(
        repository.clone(),
        storage.clone(),
        SchoolValidator::new(),
    );
    Fixture {
        service,
        repository,
        storage,
    }
}

fn origin() -> RequestOrigin {
    RequestOrigin::new("http://localhost:5000")
}

fn draft(name: &str, email: &str) -> SchoolDraft {
    SchoolDraft {
        name: Some(name.to_string()),
        address: Some("42 Lake View Road, Sector 9".to_string()),
        city: Some("Pune".to_string()),
        state: Some("Maharashtra".to_string()),
        contact: Some("9123456789".to_string()),
        email_id: Some(email.to_string()),
    }
}

fn upload(filename: &str) -> ImageUpload {
    ImageUpload {
        filename: filename.to_string(),
        content: b"fake-image-bytes".to_vec(),
        content_type: Some("image/jpeg".to_string()),
    }
}

#[tokio::test]
async fn test_add_then_get_resolves_image_url() {
    let fx = fixture();
    let school = fx
        .service
        .add_school(draft("Springdale", "a@b.com"), Some(upload("logo.jpg")), &origin())
        .await
        .unwrap();

    assert!(school.image.starts_with("http://localhost:5000/schoolImages/"));

    let fetched = fx.service.get_school(&school.id, &origin()).await.unwrap();
    assert!(!fetched.image.is_empty());
    assert!(fetched.image.starts_with("http://localhost:5000/"));
}

#[tokio::test]
async fn test_add_requires_all_fields() {
    let fx = fixture();
    let mut incomplete = draft("Springdale", "a@b.com");
    incomplete.city = None;

    let err = fx
        .service
        .add_school(incomplete, Some(upload("logo.jpg")), &origin())
        .await
        .unwrap_err();

    assert!(matches!(err, SchoolError::Validation(ref msg) if msg == "All fields are required"));
    // 校验失败时不应留下任何已存储图片
    assert_eq!(fx.storage.count(), 0);
}

#[tokio::test]
async fn test_add_accumulates_validation_errors() {
    let fx = fixture();
    let mut bad = draft("S", "a@b.com");
    bad.address = Some("short but here".to_string());
    bad.contact = Some("5123456789".to_string());

    let err = fx
        .service
        .add_school(bad, Some(upload("logo.jpg")), &origin())
        .await
        .unwrap_err();

    let SchoolError::Validation(message) = err else {
        panic!("expected validation error");
    };
    assert!(message.contains("School name"));
    assert!(message.contains("mobile number"));
    assert_eq!(message.matches(", ").count(), 1);
}

#[tokio::test]
async fn test_add_requires_image() {
    let fx = fixture();
    let err = fx
        .service
        .add_school(draft("Springdale", "a@b.com"), None, &origin())
        .await
        .unwrap_err();

    assert!(matches!(err, SchoolError::Validation(ref msg) if msg == "School image is required"));
}

#[tokio::test]
async fn test_duplicate_email_leaves_no_orphan_image() {
    let fx = fixture();
    fx.service
        .add_school(draft("First", "same@b.com"), Some(upload("one.jpg")), &origin())
        .await
        .unwrap();

    let err = fx
        .service
        .add_school(draft("Second", "same@b.com"), Some(upload("two.jpg")), &origin())
        .await
        .unwrap_err();

    assert!(matches!(err, SchoolError::DuplicateEmail));
    // 只保留第一次成功上传的图片
    assert_eq!(fx.storage.count(), 1);
}

#[tokio::test]
async fn test_update_replaces_image() {
    let fx = fixture();
    let school = fx
        .service
        .add_school(draft("Springdale", "a@b.com"), Some(upload("old.jpg")), &origin())
        .await
        .unwrap();
    let old_reference = fx.repository.find_by_id(&school.id).await.unwrap().unwrap().image;

    let updated = fx
        .service
        .update_school(&school.id, draft("Springdale", "a@b.com"), Some(upload("new.jpg")), &origin())
        .await
        .unwrap();

    let new_reference = fx.repository.find_by_id(&school.id).await.unwrap().unwrap().image;
    assert!(!fx.storage.contains(&old_reference));
    assert!(fx.storage.contains(&new_reference));
    assert!(updated.image.ends_with(&new_reference));

    // list反映新引用
    let listed = fx.service.list_schools(&origin()).await.unwrap();
    assert!(listed[0].image.ends_with(&new_reference));
}

#[tokio::test]
async fn test_update_without_image_keeps_reference() {
    let fx = fixture();
    let school = fx
        .service
        .add_school(draft("Springdale", "a@b.com"), Some(upload("keep.jpg")), &origin())
        .await
        .unwrap();
    let reference = fx.repository.find_by_id(&school.id).await.unwrap().unwrap().image;

    let updated = fx
        .service
        .update_school(&school.id, draft("Renamed School", "a@b.com"), None, &origin())
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed School");
    let kept = fx.repository.find_by_id(&school.id).await.unwrap().unwrap().image;
    assert_eq!(kept, reference);
    assert!(fx.storage.contains(&reference));
}

#[tokio::test]
async fn test_update_survives_old_image_delete_failure() {
    let fx = fixture();
    let school = fx
        .service
        .add_school(draft("Springdale", "a@b.com"), Some(upload("old.jpg")), &origin())
        .await
        .unwrap();

    // 旧图删除失败不阻断更新
    fx.storage.fail_delete.store(true, Ordering::SeqCst);
    let result = fx
        .service
        .update_school(&school.id, draft("Springdale", "a@b.com"), Some(upload("new.jpg")), &origin())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_missing_school_is_not_found() {
    let fx = fixture();
    let err = fx
        .service
        .update_school("school-999", draft("Springdale", "a@b.com"), None, &origin())
        .await
        .unwrap_err();

    assert!(matches!(err, SchoolError::NotFound));
}

#[tokio::test]
async fn test_delete_removes_record_and_image() {
    let fx = fixture();
    let school = fx
        .service
        .add_school(draft("Springdale", "a@b.com"), Some(upload("gone.jpg")), &origin())
        .await
        .unwrap();

    fx.service.delete_school(&school.id).await.unwrap();

    let err = fx.service.get_school(&school.id, &origin()).await.unwrap_err();
    assert!(matches!(err, SchoolError::NotFound));
    assert_eq!(fx.storage.count(), 0);
}

#[tokio::test]
async fn test_delete_blank_id_is_validation_error() {
    let fx = fixture();
    let err = fx.service.delete_school("   ").await.unwrap_err();
    assert!(matches!(err, SchoolError::Validation(_)));
}

#[tokio::test]
async fn test_delete_missing_school_is_not_found() {
    let fx = fixture();
    let err = fx.service.delete_school("school-404").await.unwrap_err();
    assert!(matches!(err, SchoolError::NotFound));
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_newest_first() {
    let fx = fixture();
    let mut first = draft("Springfield High", "first@b.com");
    first.city = Some("Mumbai".to_string());
    fx.service
        .add_school(first, Some(upload("a.jpg")), &origin())
        .await
        .unwrap();

    fx.service
        .add_school(draft("Riverside Academy", "second@b.com"), Some(upload("b.jpg")), &origin())
        .await
        .unwrap();

    let mut third = draft("Hill School", "third@b.com");
    third.address = Some("12 Spring Garden Avenue".to_string());
    let newest = fx
        .service
        .add_school(third, Some(upload("c.jpg")), &origin())
        .await
        .unwrap();

    let results = fx.service.search_schools("SPRING", &origin()).await.unwrap();

    // 只有name或address含spring的两条，后插入的排前面
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, newest.id);
    assert!(results.iter().all(|school| {
        format!("{} {}", school.name, school.address)
            .to_lowercase()
            .contains("spring")
    }));
}

#[tokio::test]
async fn test_list_newest_first() {
    let fx = fixture();
    fx.service
        .add_school(draft("Oldest", "one@b.com"), Some(upload("a.jpg")), &origin())
        .await
        .unwrap();
    let newest = fx
        .service
        .add_school(draft("Newest", "two@b.com"), Some(upload("b.jpg")), &origin())
        .await
        .unwrap();

    let listed = fx.service.list_schools(&origin()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newest.id);
}
