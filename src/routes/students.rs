use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::students::{SaveStudentRequest, StudentListQuery};
use crate::models::users::entities::UserRole;
use crate::services::StudentService;
use crate::utils::SafeRecordId;

// 懒加载的全局 StudentService 实例
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentListQuery>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list(query.into_inner(), &req).await
}

pub async fn save_student(
    req: HttpRequest,
    student_data: web::Json<SaveStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.save(student_data.into_inner(), &req).await
}

pub async fn delete_student(req: HttpRequest, id: SafeRecordId) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.delete(&id.0, &req).await
}

// 配置路由，名册整体仅限教师
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireSession)
            .route("", web::get().to(list_students))
            .route("", web::post().to(save_student))
            .route("/{id}", web::delete().to(delete_student)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        STUDENT_EMAIL, STUDENT_PASSWORD, TEACHER_EMAIL, TEACHER_PASSWORD, bearer, memory_context,
    };
    use actix_web::{App, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_roster_upsert_and_search() {
        let (_, context) = memory_context();
        let teacher = bearer(&context, TEACHER_EMAIL, TEACHER_PASSWORD).await;
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_student_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/students")
            .insert_header(("Authorization", teacher.clone()))
            .set_json(json!({ "id": "1715000000000", "name": "Ron Weasley", "email": "ron@burrow.net", "class": "3A" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_ne!(id, "1715000000000");

        let req = test::TestRequest::post()
            .uri("/api/v1/students")
            .insert_header(("Authorization", teacher.clone()))
            .set_json(json!({ "id": id, "name": "Ron Weasley", "email": "ron@burrow.net", "class": "3B" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get()
            .uri("/api/v1/students?search=BURROW")
            .insert_header(("Authorization", teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let roster = body["data"].as_array().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0]["class"], "3B");
    }

    #[actix_web::test]
    async fn test_students_forbidden_for_students() {
        let (_, context) = memory_context();
        let student = bearer(&context, STUDENT_EMAIL, STUDENT_PASSWORD).await;
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_student_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/students")
            .insert_header(("Authorization", student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        let req = test::TestRequest::get().uri("/api/v1/students").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
