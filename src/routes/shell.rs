use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::shell::{NavigateRequest, OpenShellRequest};
use crate::services::ShellService;
use crate::utils::SafeShellId;

// 懒加载的全局 ShellService 实例
static SHELL_SERVICE: Lazy<ShellService> = Lazy::new(ShellService::new_lazy);

pub async fn open_shell(
    req: HttpRequest,
    open_data: Option<web::Json<OpenShellRequest>>,
) -> ActixResult<HttpResponse> {
    let open_request = open_data.map(|d| d.into_inner()).unwrap_or_default();
    SHELL_SERVICE.open(open_request, &req).await
}

pub async fn shell_state(req: HttpRequest, shell_id: SafeShellId) -> ActixResult<HttpResponse> {
    SHELL_SERVICE.state(&shell_id.0, &req).await
}

pub async fn navigate_shell(
    req: HttpRequest,
    shell_id: SafeShellId,
    navigate_data: web::Json<NavigateRequest>,
) -> ActixResult<HttpResponse> {
    SHELL_SERVICE
        .navigate(&shell_id.0, navigate_data.into_inner(), &req)
        .await
}

pub async fn close_shell(req: HttpRequest, shell_id: SafeShellId) -> ActixResult<HttpResponse> {
    SHELL_SERVICE.close(&shell_id.0, &req).await
}

// 配置路由
pub fn configure_shell_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/shell")
            .wrap(middlewares::RequireSession)
            .route("", web::post().to(open_shell))
            .route("/{shell_id}", web::get().to(shell_state))
            .route("/{shell_id}", web::delete().to(close_shell))
            .route("/{shell_id}/view", web::put().to(navigate_shell)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::chat::configure_chat_routes;
    use crate::services::test_support::{
        STUDENT_EMAIL, STUDENT_PASSWORD, TEACHER_EMAIL, TEACHER_PASSWORD, bearer, memory_context,
    };
    use actix_web::{App, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_unread_flag_follows_chat_view() {
        let (_, context) = memory_context();
        let teacher = bearer(&context, TEACHER_EMAIL, TEACHER_PASSWORD).await;
        let student = bearer(&context, STUDENT_EMAIL, STUDENT_PASSWORD).await;
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_shell_routes)
                .configure(configure_chat_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shell")
            .insert_header(("Authorization", student.clone()))
            .set_json(json!({ "path": "/materials" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["roleLabel"], "Student");
        assert!(
            body["data"]["navigation"]
                .as_array()
                .unwrap()
                .iter()
                .all(|item| item["path"] != "/students")
        );
        let shell_id = body["data"]["shellId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/chat/messages")
            .insert_header(("Authorization", teacher))
            .set_json(json!({ "text": "Homework is up" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/shell/{shell_id}"))
            .insert_header(("Authorization", student.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["hasUnreadMessages"], true);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/shell/{shell_id}/view"))
            .insert_header(("Authorization", student.clone()))
            .set_json(json!({ "path": "/chat" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["activeView"], "/chat");
        assert_eq!(body["data"]["hasUnreadMessages"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/shell/{shell_id}"))
            .insert_header(("Authorization", student.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/shell/{shell_id}"))
            .insert_header(("Authorization", student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_shell_is_owner_scoped() {
        let (_, context) = memory_context();
        let teacher = bearer(&context, TEACHER_EMAIL, TEACHER_PASSWORD).await;
        let student = bearer(&context, STUDENT_EMAIL, STUDENT_PASSWORD).await;
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_shell_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/shell")
            .insert_header(("Authorization", teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let shell_id = body["data"]["shellId"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/shell/{shell_id}"))
            .insert_header(("Authorization", student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
