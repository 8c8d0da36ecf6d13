use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::events::{CalendarQuery, CreateEventRequest};
use crate::models::users::entities::UserRole;
use crate::services::{CalendarService, EventService};
use crate::utils::SafeRecordId;

// 懒加载的全局服务实例
static EVENT_SERVICE: Lazy<EventService> = Lazy::new(EventService::new_lazy);
static CALENDAR_SERVICE: Lazy<CalendarService> = Lazy::new(CalendarService::new_lazy);

pub async fn list_events(req: HttpRequest) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.list(&req).await
}

pub async fn create_event(
    req: HttpRequest,
    event_data: web::Json<CreateEventRequest>,
) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.create(event_data.into_inner(), &req).await
}

pub async fn delete_event(req: HttpRequest, id: SafeRecordId) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.delete(&id.0, &req).await
}

pub async fn calendar_month(
    req: HttpRequest,
    query: web::Query<CalendarQuery>,
) -> ActixResult<HttpResponse> {
    CALENDAR_SERVICE.month(query.into_inner(), &req).await
}

pub async fn list_subjects() -> ActixResult<HttpResponse> {
    CALENDAR_SERVICE.subjects().await
}

// 配置路由
pub fn configure_event_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/events")
            .wrap(middlewares::RequireSession)
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .route(web::get().to(list_events)),
            )
            .service(
                web::resource("")
                    .guard(guard::Post())
                    .wrap(middlewares::RequireRole::new(&UserRole::Teacher))
                    .route(web::post().to(create_event)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(middlewares::RequireRole::new(&UserRole::Teacher))
                    .route(web::delete().to(delete_event)),
            ),
    )
    .service(
        web::resource("/api/v1/calendar")
            .wrap(middlewares::RequireSession)
            .route(web::get().to(calendar_month)),
    )
    .service(
        web::resource("/api/v1/subjects")
            .wrap(middlewares::RequireSession)
            .route(web::get().to(list_subjects)),
    );
}
