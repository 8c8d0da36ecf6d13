//! 路径参数安全提取器

use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures_util::future::{Ready, ready};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ApiResponse, ErrorCode};

static RECORD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("Invalid record id regex"));

fn invalid_path(message: &'static str) -> actix_web::Error {
    InternalError::from_response(
        message,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// 路径中的 `{id}`：uuid 或数字主键
#[derive(Debug, Clone, PartialEq)]
pub struct SafeRecordId(pub String);

impl FromRequest for SafeRecordId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id").unwrap_or_default();
        if RECORD_ID_RE.is_match(raw) {
            ready(Ok(SafeRecordId(raw.to_string())))
        } else {
            ready(Err(invalid_path("Invalid record id")))
        }
    }
}

/// 路径中的 `{shell_id}`
#[derive(Debug, Clone, PartialEq)]
pub struct SafeShellId(pub String);

impl FromRequest for SafeShellId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("shell_id").unwrap_or_default();
        if RECORD_ID_RE.is_match(raw) {
            ready(Ok(SafeShellId(raw.to_string())))
        } else {
            ready(Err(invalid_path("Invalid shell id")))
        }
    }
}
