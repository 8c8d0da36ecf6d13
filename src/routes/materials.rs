use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::materials::MaterialListQuery;
use crate::models::users::entities::UserRole;
use crate::services::MaterialService;
use crate::utils::SafeRecordId;

// 懒加载的全局 MaterialService 实例
static MATERIAL_SERVICE: Lazy<MaterialService> = Lazy::new(MaterialService::new_lazy);

pub async fn list_materials(
    req: HttpRequest,
    query: web::Query<MaterialListQuery>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.list(query.into_inner(), &req).await
}

pub async fn upload_material(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.upload(&req, payload).await
}

pub async fn delete_material(req: HttpRequest, id: SafeRecordId) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.delete(&id.0, &req).await
}

// 配置路由
pub fn configure_material_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/materials")
            .wrap(middlewares::RequireSession)
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .route(web::get().to(list_materials)),
            )
            // 上传与删除仅限教师
            .service(
                web::resource("")
                    .guard(guard::Post())
                    .wrap(middlewares::RequireRole::new(&UserRole::Teacher))
                    .route(web::post().to(upload_material)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(middlewares::RequireRole::new(&UserRole::Teacher))
                    .route(web::delete().to(delete_material)),
            ),
    );
}
