use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{LoginRequest, RefreshRequest};
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login(
    req: HttpRequest,
    login_data: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(login_data.into_inner(), &req).await
}

pub async fn refresh(
    req: HttpRequest,
    refresh_data: web::Json<RefreshRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.refresh(refresh_data.into_inner(), &req).await
}

pub async fn me(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.me(&request).await
}

pub async fn logout(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&request).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireSession)
                    .route("/me", web::get().to(me))
                    .route("/logout", web::post().to(logout)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        STUDENT_EMAIL, STUDENT_PASSWORD, TEACHER_EMAIL, TEACHER_PASSWORD, memory_context,
    };
    use actix_web::{App, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_login_me_logout() {
        let (_, context) = memory_context();
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": TEACHER_EMAIL, "password": TEACHER_PASSWORD }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["user"]["role"], "TEACHER");
        let token = body["data"]["access_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["email"], TEACHER_EMAIL);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_login_failure_is_generic() {
        let (_, context) = memory_context();
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": STUDENT_EMAIL, "password": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 2000);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "ghost@example.com", "password": STUDENT_PASSWORD }))
            .to_request();
        let other: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(other["message"], body["message"]);
    }

    #[actix_web::test]
    async fn test_refresh_rotates_session() {
        let (_, context) = memory_context();
        let app = test::init_service(
            App::new()
                .configure(|cfg| context.register(cfg))
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": STUDENT_EMAIL, "password": STUDENT_PASSWORD }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": refresh_token }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["user"]["role"], "STUDENT");

        // 刷新令牌只能使用一次
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": refresh_token }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
