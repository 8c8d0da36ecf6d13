use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::EventService;
use crate::config::AppConfig;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    events::{CreateEventRequest, NewEvent},
};
use crate::utils::PortalClock;

/// 校验并补全新日程，结束时间缺省为开始时间
///
/// 时间按门户本地时区解释，保存为带偏移的 RFC 3339，数据库不再按自身时区解读。
pub fn prepare_event(
    create_request: CreateEventRequest,
    created_by: &str,
    clock: &PortalClock,
) -> Result<NewEvent, &'static str> {
    let title = create_request.title.trim();
    if title.is_empty() {
        return Err("Title is required");
    }
    let start = create_request.start.trim();
    if start.is_empty() {
        return Err("Start time is required");
    }
    let start_at = clock.parse(start).ok_or("Start time is not a valid date")?;

    let end_at = match create_request
        .end
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    {
        Some(end) => {
            let end_at = clock.parse(end).ok_or("End time is not a valid date")?;
            if end_at < start_at {
                return Err("End time must not be before start time");
            }
            end_at
        }
        None => start_at,
    };

    Ok(NewEvent {
        title: title.to_string(),
        description: create_request.description.unwrap_or_default().trim().to_string(),
        start: start_at.to_rfc3339(),
        end: end_at.to_rfc3339(),
        category: create_request.category,
        subject: create_request
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        created_by: created_by.to_string(),
    })
}

pub async fn handle_create(
    service: &EventService,
    create_request: CreateEventRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let clock = PortalClock::from_offset_minutes(AppConfig::get().portal.utc_offset_minutes);
    let new_event = match prepare_event(create_request, &user.id, &clock) {
        Ok(event) => event,
        Err(message) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::EventInvalid, message)));
        }
    };

    match service.get_backend(request).storage.insert_event(new_event).await {
        Ok(event) => {
            info!("Event '{}' created by {}", event.title, user.email);
            Ok(HttpResponse::Created().json(ApiResponse::success(event, "Event created")))
        }
        Err(e) => {
            error!("Failed to create event: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::EventCreationFailed,
                "Failed to create event",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::EventCategory;

    fn request(title: &str, start: &str, end: Option<&str>) -> CreateEventRequest {
        CreateEventRequest {
            title: title.to_string(),
            description: None,
            start: start.to_string(),
            end: end.map(str::to_string),
            category: EventCategory::Review,
            subject: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_end_defaults_to_start() {
        let clock = PortalClock::utc();
        let event = prepare_event(request(" Review ", "2024-05-10T09:00", None), "u-1", &clock)
            .unwrap();
        assert_eq!(event.title, "Review");
        assert_eq!(event.start, "2024-05-10T09:00:00+00:00");
        assert_eq!(event.end, event.start);
        assert_eq!(event.subject, None);
        assert_eq!(event.created_by, "u-1");
    }

    #[test]
    fn test_required_fields() {
        let clock = PortalClock::utc();
        assert!(prepare_event(request("", "2024-05-10T09:00", None), "u-1", &clock).is_err());
        assert!(prepare_event(request("Exam", "", None), "u-1", &clock).is_err());
        assert!(prepare_event(request("Exam", "tomorrow", None), "u-1", &clock).is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let clock = PortalClock::utc();
        let result = prepare_event(
            request("Exam", "2024-05-10T09:00", Some("2024-05-10T08:00")),
            "u-1",
            &clock,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_local_time_stored_with_offset() {
        // UTC-3：本地 01:00 是 UTC 04:00，仍属于本地的 5 月 10 日
        let clock = PortalClock::from_offset_minutes(-180);
        let event = prepare_event(request("Exam", "2024-05-10T01:00", None), "u-1", &clock)
            .unwrap();
        assert_eq!(event.start, "2024-05-10T01:00:00-03:00");

        // 数据库以 UTC 返回同一时刻
        let echoed = clock
            .parse(&event.start)
            .unwrap()
            .with_timezone(&chrono::Utc)
            .to_rfc3339();
        assert_eq!(echoed, "2024-05-10T04:00:00+00:00");
        assert_eq!(
            clock.local_date(&echoed),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 10)
        );
    }
}
