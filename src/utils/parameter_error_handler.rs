use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError};

use crate::errors::ElearningError;

/// 查询参数解析失败时返回统一的 400 响应
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ElearningError::validation(format!("Invalid query parameters: {err}")).into()
}

/// JSON 请求体解析失败时返回统一的 400 响应
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ElearningError::validation(format!("Invalid JSON body: {err}")).into()
}
