use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_domain::{ImageUpload, SchoolDraft};
use chrono::Utc;
use serde_json::json;

use crate::extractors::RequestBase;
use crate::response::{ApiError, MessageResponse, SchoolListResponse, SchoolResponse};
use crate::AppState;

/// multipart表单解析结果
struct SchoolForm {
    draft: SchoolDraft,
    image: Option<ImageUpload>,
}

/// 从multipart中提取文本字段和图片文件，未知字段忽略
async fn read_school_form(multipart: &mut Multipart) -> Result<SchoolForm, ApiError> {
    let mut draft = SchoolDraft::default();
    let mut image = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Invalid multipart form data"))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|value| value.to_string());

                // 读取文件内容
                let mut content = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid multipart form data"))?
                {
                    content.extend_from_slice(&chunk);
                }

                if !content.is_empty() {
                    image = Some(ImageUpload {
                        filename,
                        content,
                        content_type,
                    });
                }
            }
            "name" => draft.name = read_text(field).await?,
            "address" => draft.address = read_text(field).await?,
            "city" => draft.city = read_text(field).await?,
            "state" => draft.state = read_text(field).await?,
            "contact" => draft.contact = read_text(field).await?,
            "email_id" => draft.email_id = read_text(field).await?,
            _ => {}
        }
    }

    Ok(SchoolForm { draft, image })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, ApiError> {
    let value = field
        .text()
        .await
        .map_err(|_| ApiError::bad_request("Invalid multipart form data"))?;
    Ok(Some(value))
}

/// 健康检查
/// GET /api/health
pub async fn health_check() -> Response {
    Json(json!({
        "status": "OK",
        "message": "School Management API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

/// 列出全部学校，最新的在前
/// GET /api/schools
pub async fn list_schools(
    State(state): State<AppState>,
    base: RequestBase,
) -> Result<Response, ApiError> {
    let schools = state.school_service.list_schools(&base.origin()).await?;
    Ok(Json(SchoolListResponse::new(schools)).into_response())
}

/// 按关键词搜索学校
/// GET /api/schools/search/:term
pub async fn search_schools(
    State(state): State<AppState>,
    Path(term): Path<String>,
    base: RequestBase,
) -> Result<Response, ApiError> {
    let schools = state
        .school_service
        .search_schools(&term, &base.origin())
        .await?;
    Ok(Json(SchoolListResponse::new(schools)).into_response())
}

/// 获取单个学校
/// GET /api/schools/:id
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<String>,
    base: RequestBase,
) -> Result<Response, ApiError> {
    let school = state.school_service.get_school(&id, &base.origin()).await?;
    Ok(Json(SchoolResponse {
        success: true,
        message: None,
        data: school,
    })
    .into_response())
}

/// 新增学校
/// POST /api/schools
pub async fn add_school(
    State(state): State<AppState>,
    base: RequestBase,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_school_form(&mut multipart).await?;

    let school = state
        .school_service
        .add_school(form.draft, form.image, &base.origin())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SchoolResponse {
            success: true,
            message: Some("School added successfully".to_string()),
            data: school,
        }),
    )
        .into_response())
}

/// 更新学校，图片可选
/// PUT /api/schools/:id
pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<String>,
    base: RequestBase,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_school_form(&mut multipart).await?;

    let school = state
        .school_service
        .update_school(&id, form.draft, form.image, &base.origin())
        .await?;

    Ok(Json(SchoolResponse {
        success: true,
        message: Some("School updated successfully".to_string()),
        data: school,
    })
    .into_response())
}

/// 删除学校及其图片
/// DELETE /api/schools/:id
pub async fn delete_school(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.school_service.delete_school(&id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "School deleted successfully".to_string(),
    })
    .into_response())
}
