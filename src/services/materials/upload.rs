use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::path::Path;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::MaterialService;
use crate::config::AppConfig;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    materials::{MaterialKind, NewMaterial},
};
use crate::utils::content_matches_kind;

// 上传失败统一提示
const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Check your connection and try again.";

#[derive(Default)]
struct UploadForm {
    title: String,
    description: String,
    subject: String,
    file_name: String,
    content_type: String,
    data: Option<Bytes>,
}

/// 存储对象键：时间戳 + 随机串 + 原扩展名
fn object_key(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();
    format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}

fn content_type_for(kind: MaterialKind, declared: &str) -> String {
    match kind {
        MaterialKind::Pdf => "application/pdf".to_string(),
        MaterialKind::Docx => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string()
        }
        MaterialKind::Other if !declared.is_empty() => declared.to_string(),
        MaterialKind::Other => "application/octet-stream".to_string(),
    }
}

fn bad_request(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub async fn handle_upload(
    service: &MaterialService,
    req: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let max_size = AppConfig::get().upload.max_size;
    let mut form = UploadForm::default();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name == "file" {
            if form.data.is_some() {
                return Ok(bad_request(
                    ErrorCode::MultifileUploadNotAllowed,
                    "Only one file can be uploaded at a time",
                ));
            }
            form.file_name = content_disposition
                .and_then(|cd| cd.get_filename())
                .map(|s| s.to_string())
                .unwrap_or_default();
            form.content_type = field
                .content_type()
                .map(|ct| ct.to_string())
                .unwrap_or_default();

            let mut buffer = BytesMut::new();
            while let Some(chunk) = field.next().await {
                let data = chunk?;
                if buffer.len() + data.len() > max_size {
                    return Ok(bad_request(
                        ErrorCode::FileSizeExceeded,
                        "File size exceeds the limit",
                    ));
                }
                buffer.extend_from_slice(&data);
            }
            form.data = Some(buffer.freeze());
        } else {
            let mut buffer = BytesMut::new();
            while let Some(chunk) = field.next().await {
                buffer.extend_from_slice(&chunk?);
            }
            let value = String::from_utf8_lossy(&buffer).trim().to_string();
            match name.as_str() {
                "title" => form.title = value,
                "description" => form.description = value,
                "subject" => form.subject = value,
                other => warn!("Ignoring unexpected upload field '{}'", other),
            }
        }
    }

    let Some(data) = form.data.take() else {
        return Ok(bad_request(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        ));
    };
    if form.title.is_empty() || form.subject.is_empty() {
        return Ok(bad_request(
            ErrorCode::MaterialInvalid,
            "Title and subject are required",
        ));
    }

    let kind = MaterialKind::from_file_name(&form.file_name);
    if !content_matches_kind(&data, kind) {
        return Ok(bad_request(
            ErrorCode::MaterialInvalid,
            "File content does not match its extension",
        ));
    }

    let Some(user) = RequireSession::extract_user(req) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let backend = service.get_backend(req);
    let key = object_key(&form.file_name);
    let size = data.len();

    if let Err(e) = backend
        .objects
        .upload(&key, data, &content_type_for(kind, &form.content_type))
        .await
    {
        error!("Material file upload failed: {}", e);
        return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::MaterialUploadFailed,
            UPLOAD_FAILED_MESSAGE,
        )));
    }

    let new_material = NewMaterial {
        title: form.title,
        description: form.description,
        subject: form.subject,
        kind,
        url: backend.objects.public_url(&key),
        uploaded_by: user.name.clone(),
    };

    match backend.storage.insert_material(new_material).await {
        Ok(material) => {
            info!(
                "Material '{}' uploaded by {} ({} bytes)",
                material.title, user.email, size
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(material, "Material uploaded")))
        }
        Err(e) => {
            // 文件已上传但元数据写入失败，对象保留
            error!("Material metadata insert failed, object {} is orphaned: {}", key, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::MaterialUploadFailed,
                UPLOAD_FAILED_MESSAGE,
            )))
        }
    }
}
