use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::StudentService;
use crate::baas::Storage;
use crate::errors::{PortalError, Result};
use crate::models::{
    ApiResponse, ErrorCode,
    students::{SaveStudentRequest, Student, StudentPayload},
};
use crate::utils::validate::{require_text, validate_email};

// 存储签发的 id（uuid）长度大于此值；客户端临时 id 不超过
const ISSUED_ID_MIN_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertAction {
    Create,
    Update(String),
}

/// 带有已签发 id 时更新，否则新建
pub fn upsert_action(id: Option<&str>) -> UpsertAction {
    match id.map(str::trim) {
        Some(id) if id.len() > ISSUED_ID_MIN_LEN => UpsertAction::Update(id.to_string()),
        _ => UpsertAction::Create,
    }
}

fn validate(save_request: &SaveStudentRequest) -> std::result::Result<StudentPayload, &'static str> {
    let name = require_text(&save_request.name, "Name is required")?;
    let email = require_text(&save_request.email, "Email is required")?;
    validate_email(email)?;
    Ok(StudentPayload {
        name: name.to_string(),
        email: email.to_string(),
        class: save_request.class.trim().to_string(),
    })
}

/// 执行新建或更新，更新的记录不存在时返回 NotFound
pub async fn upsert_student(
    storage: &dyn Storage,
    action: UpsertAction,
    payload: StudentPayload,
) -> Result<Student> {
    match action {
        UpsertAction::Create => storage.insert_student(payload).await,
        UpsertAction::Update(id) => storage
            .update_student(&id, payload)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Student {id} not found"))),
    }
}

pub async fn handle_save(
    service: &StudentService,
    save_request: SaveStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let payload = match validate(&save_request) {
        Ok(payload) => payload,
        Err(message) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::StudentInvalid, message)));
        }
    };

    let action = upsert_action(save_request.id.as_deref());
    let storage = service.get_backend(request).storage;

    match upsert_student(storage.as_ref(), action.clone(), payload).await {
        Ok(student) => {
            info!("Student {} saved ({:?})", student.id, action);
            let response = match action {
                UpsertAction::Create => HttpResponse::Created(),
                UpsertAction::Update(_) => HttpResponse::Ok(),
            }
            .json(ApiResponse::success(student, "Student saved"));
            Ok(response)
        }
        Err(PortalError::NotFound(message)) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::StudentNotFound, message))),
        Err(e) => {
            error!("Failed to save student: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::StudentSaveFailed,
                "Failed to save student",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryBackend;

    fn payload(name: &str, class: &str) -> StudentPayload {
        StudentPayload {
            name: name.to_string(),
            email: "ron@burrow.net".to_string(),
            class: class.to_string(),
        }
    }

    #[test]
    fn test_upsert_action_by_id_length() {
        assert_eq!(upsert_action(None), UpsertAction::Create);
        assert_eq!(upsert_action(Some("1715000000000")), UpsertAction::Create);
        let issued = "0b5c3a8e-6f0e-4b59-9a55-6d0f1f3c2a10";
        assert_eq!(
            upsert_action(Some(issued)),
            UpsertAction::Update(issued.to_string())
        );
    }

    #[tokio::test]
    async fn test_create_then_update_preserves_id() {
        let storage = MemoryBackend::new();
        let created = upsert_student(&storage, UpsertAction::Create, payload("Ron", "3A"))
            .await
            .unwrap();

        let action = upsert_action(Some(&created.id));
        let updated = upsert_student(&storage, action, payload("Ron W.", "3B"))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Ron W.");
        assert_eq!(updated.class, "3B");
        assert_eq!(storage.list_students().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_student() {
        let storage = MemoryBackend::new();
        let action = UpsertAction::Update("0b5c3a8e-6f0e-4b59-9a55-6d0f1f3c2a10".to_string());
        let err = upsert_student(&storage, action, payload("Ron", "3A"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");
    }

    #[test]
    fn test_validation() {
        let request = SaveStudentRequest {
            id: None,
            name: " ".to_string(),
            email: "ron@burrow.net".to_string(),
            class: String::new(),
        };
        assert!(validate(&request).is_err());

        let request = SaveStudentRequest {
            name: "Ron".to_string(),
            email: "not-an-email".to_string(),
            ..request
        };
        assert!(validate(&request).is_err());
    }
}
