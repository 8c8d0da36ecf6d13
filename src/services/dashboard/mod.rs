pub mod upcoming;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Timelike;
use tracing::warn;

use crate::baas::Backend;
use crate::config::AppConfig;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    dashboard::{DashboardResponse, DashboardStats},
};
use crate::utils::PortalClock;

pub struct DashboardService {
    backend: Option<Backend>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { backend: None }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Backend {
        super::resolve_backend(&self.backend, request)
    }

    pub async fn overview(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let Some(user) = RequireSession::extract_user(request) else {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Authentication required",
            )));
        };

        let config = AppConfig::get();
        let clock = PortalClock::from_offset_minutes(config.portal.utc_offset_minutes);
        let storage = self.get_backend(request).storage;

        // 名册只在教师视图中读取
        let students = async {
            if user.is_teacher() {
                Some(storage.list_students().await)
            } else {
                None
            }
        };

        // 并发读取，任一失败按空列表处理
        let (materials, events, students) =
            tokio::join!(storage.list_materials(), storage.list_events(), students);
        let materials = materials.unwrap_or_else(|e| {
            warn!("Dashboard could not load materials: {}", e);
            Vec::new()
        });
        let events = events.unwrap_or_else(|e| {
            warn!("Dashboard could not load events: {}", e);
            Vec::new()
        });
        let students_count = students.map(|students| {
            students.map(|s| s.len()).unwrap_or_else(|e| {
                warn!("Dashboard could not load students: {}", e);
                0
            })
        });

        let now = clock.now();
        let upcoming = upcoming::select_upcoming(
            &events,
            now.date_naive(),
            &clock,
            config.portal.upcoming_limit,
        );

        let response = DashboardResponse {
            greeting: upcoming::greeting(now.hour()).to_string(),
            first_name: user.first_name().to_string(),
            stats: DashboardStats {
                materials_count: materials.len(),
                events_count: events.len(),
                upcoming_events: upcoming.len(),
                students_count,
            },
            upcoming,
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Dashboard loaded")))
    }
}
