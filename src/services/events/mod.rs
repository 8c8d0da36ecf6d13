pub mod create;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::baas::Backend;
use crate::models::{ApiResponse, events::CreateEventRequest};

pub struct EventService {
    backend: Option<Backend>,
}

impl EventService {
    pub fn new_lazy() -> Self {
        Self { backend: None }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Backend {
        super::resolve_backend(&self.backend, request)
    }

    // 全部日程
    pub async fn list(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let events = self
            .get_backend(request)
            .storage
            .list_events()
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to list events: {}", e);
                Vec::new()
            });
        Ok(HttpResponse::Ok().json(ApiResponse::success(events, "Events loaded")))
    }

    // 新建日程
    pub async fn create(
        &self,
        create_request: CreateEventRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create(self, create_request, request).await
    }

    // 删除日程：失败只记录，仍返回成功
    pub async fn delete(&self, id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        match self.get_backend(request).storage.delete_event(id).await {
            Ok(()) => info!("Event {} deleted", id),
            Err(e) => error!("Failed to delete event {}: {}", id, e),
        }
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Event deleted")))
    }
}
