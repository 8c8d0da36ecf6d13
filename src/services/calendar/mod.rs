pub mod grid;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use tracing::warn;

use crate::baas::Backend;
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    events::{CalendarQuery, CategoryOption, EventCategory, SubjectsResponse},
};
use crate::utils::PortalClock;

pub struct CalendarService {
    backend: Option<Backend>,
}

impl CalendarService {
    pub fn new_lazy() -> Self {
        Self { backend: None }
    }

    pub(crate) fn get_backend(&self, request: &HttpRequest) -> Backend {
        super::resolve_backend(&self.backend, request)
    }

    // 月历
    pub async fn month(
        &self,
        query: CalendarQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let config = AppConfig::get();
        let clock = PortalClock::from_offset_minutes(config.portal.utc_offset_minutes);
        let today = clock.today();

        let reference = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) => {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::BadRequest,
                        "Invalid date, expected YYYY-MM-DD",
                    )));
                }
            },
            None => today,
        };

        let events = self
            .get_backend(request)
            .storage
            .list_events()
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to load events for calendar: {}", e);
                Vec::new()
            });

        let grid = grid::build_month_grid(reference, today, &events, &clock);
        Ok(HttpResponse::Ok().json(ApiResponse::success(grid, "Calendar loaded")))
    }

    // 学科与日程类别
    pub async fn subjects(&self) -> ActixResult<HttpResponse> {
        let config = AppConfig::get();
        let response = SubjectsResponse {
            subjects: config.portal.subjects.clone(),
            categories: EventCategory::all()
                .iter()
                .map(|category| CategoryOption {
                    value: *category,
                    label: category.label(),
                })
                .collect(),
        };
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Subjects loaded")))
    }
}
