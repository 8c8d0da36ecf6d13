pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::baas::Backend;
use crate::models::{
    ApiResponse,
    materials::{Material, MaterialListQuery},
};

// 表示不按学科筛选
const ALL_SUBJECTS: &str = "all";

pub struct MaterialService {
    backend: Option<Backend>,
}

/// 标题搜索（忽略大小写）与学科筛选
pub fn filter_materials(materials: Vec<Material>, query: &MaterialListQuery) -> Vec<Material> {
    let search = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let subject = query
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SUBJECTS));

    materials
        .into_iter()
        .filter(|m| {
            search
                .as_deref()
                .is_none_or(|needle| m.title.to_lowercase().contains(needle))
        })
        .filter(|m| subject.is_none_or(|s| m.subject == s))
        .collect()
}

impl MaterialService {
    pub fn new_lazy() -> Self {
        Self { backend: None }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Backend {
        super::resolve_backend(&self.backend, request)
    }

    // 资料列表（按创建时间倒序）
    pub async fn list(
        &self,
        query: MaterialListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let materials = self
            .get_backend(request)
            .storage
            .list_materials()
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to list materials: {}", e);
                Vec::new()
            });
        let materials = filter_materials(materials, &query);
        Ok(HttpResponse::Ok().json(ApiResponse::success(materials, "Materials loaded")))
    }

    // 上传资料
    pub async fn upload(&self, request: &HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, payload).await
    }

    // 删除资料：失败只记录，仍返回成功
    pub async fn delete(&self, id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        match self.get_backend(request).storage.delete_material(id).await {
            Ok(()) => info!("Material {} deleted", id),
            Err(e) => error!("Failed to delete material {}: {}", id, e),
        }
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Material deleted")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::materials::MaterialKind;

    fn material(title: &str, subject: &str) -> Material {
        Material {
            id: title.to_string(),
            title: title.to_string(),
            description: String::new(),
            subject: subject.to_string(),
            kind: MaterialKind::Pdf,
            url: String::new(),
            created_at: String::new(),
            uploaded_by: "Teacher".to_string(),
        }
    }

    fn sample() -> Vec<Material> {
        vec![
            material("Algebra Basics", "Mathematics"),
            material("Cell Biology", "Biology"),
            material("Advanced algebra", "Mathematics"),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = MaterialListQuery {
            search: Some("ALGEBRA".to_string()),
            subject: None,
        };
        assert_eq!(filter_materials(sample(), &query).len(), 2);
    }

    #[test]
    fn test_subject_filter_and_all() {
        let biology = MaterialListQuery {
            search: None,
            subject: Some("Biology".to_string()),
        };
        assert_eq!(filter_materials(sample(), &biology).len(), 1);

        let all = MaterialListQuery {
            search: Some("  ".to_string()),
            subject: Some("All".to_string()),
        };
        assert_eq!(filter_materials(sample(), &all).len(), 3);
    }
}
