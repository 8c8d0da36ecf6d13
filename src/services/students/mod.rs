pub mod save;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::baas::Backend;
use crate::models::{
    ApiResponse,
    students::{SaveStudentRequest, Student, StudentListQuery},
};

pub struct StudentService {
    backend: Option<Backend>,
}

/// 按姓名或邮箱搜索（忽略大小写）
pub fn search_students(students: Vec<Student>, search: Option<&str>) -> Vec<Student> {
    let Some(needle) = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    else {
        return students;
    };
    students
        .into_iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.email.to_lowercase().contains(&needle)
        })
        .collect()
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { backend: None }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Backend {
        super::resolve_backend(&self.backend, request)
    }

    // 学生名册
    pub async fn list(
        &self,
        query: StudentListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let students = self
            .get_backend(request)
            .storage
            .list_students()
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to list students: {}", e);
                Vec::new()
            });
        let students = search_students(students, query.search.as_deref());
        Ok(HttpResponse::Ok().json(ApiResponse::success(students, "Students loaded")))
    }

    // 新建或更新学生
    pub async fn save(
        &self,
        save_request: SaveStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        save::handle_save(self, save_request, request).await
    }

    // 删除学生：失败只记录，仍返回成功
    pub async fn delete(&self, id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        match self.get_backend(request).storage.delete_student(id).await {
            Ok(()) => info!("Student {} deleted", id),
            Err(e) => error!("Failed to delete student {}: {}", id, e),
        }
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted")))
    }
}
