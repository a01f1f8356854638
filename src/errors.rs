//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称与 HTTP 状态码。
//! 认证、授权与冲突三类错误携带封闭的原因枚举，而不是自由文本。

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// 认证失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    Malformed,
    BadSignature,
    Expired,
    NoContext,
    InvalidCredentials,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AuthFailure::MissingToken => "missing or malformed bearer token",
            AuthFailure::Malformed => "token could not be decoded",
            AuthFailure::BadSignature => "token signature or algorithm mismatch",
            AuthFailure::Expired => "token expired",
            AuthFailure::NoContext => "no identity claims in request context",
            AuthFailure::InvalidCredentials => "invalid email or password",
        };
        f.write_str(text)
    }
}

/// 授权失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    Forbidden,
    NotEnrolled,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AccessDenied::Forbidden => "role is not permitted for this resource",
            AccessDenied::NotEnrolled => "student is not enrolled in the class of this assignment",
        };
        f.write_str(text)
    }
}

/// 冲突类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadySubmitted,
    DuplicateEmail,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConflictKind::AlreadySubmitted => "assignment already submitted",
            ConflictKind::DuplicateEmail => "email already registered",
        };
        f.write_str(text)
    }
}

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() / error_type() / status() / message()
/// - 便捷构造函数（snake_case）
macro_rules! define_elearning_errors {
    ($(
        $variant:ident($payload:ty, $code:literal, $type_name:literal, $status:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ElearningError {
            $($variant($payload),)*
        }

        impl ElearningError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ElearningError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ElearningError::$variant(_) => $type_name,)*
                }
            }

            /// 对应的 HTTP 状态码
            pub fn status(&self) -> StatusCode {
                match self {
                    $(ElearningError::$variant(_) => StatusCode::$status,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> String {
                match self {
                    $(ElearningError::$variant(detail) => detail.to_string(),)*
                }
            }
        }

        paste::paste! {
            impl ElearningError {
                $(
                    pub fn [<$variant:snake>]<T: Into<$payload>>(detail: T) -> Self {
                        ElearningError::$variant(detail.into())
                    }
                )*
            }
        }
    };
}

define_elearning_errors! {
    Validation(String, "E001", "Validation Error", BAD_REQUEST),
    Authentication(AuthFailure, "E002", "Authentication Error", UNAUTHORIZED),
    Authorization(AccessDenied, "E003", "Authorization Error", FORBIDDEN),
    NotFound(String, "E004", "Resource Not Found", NOT_FOUND),
    Conflict(ConflictKind, "E005", "Conflict", CONFLICT),
    Integrity(String, "E006", "Integrity Error", BAD_REQUEST),
    Configuration(String, "E007", "Configuration Error", INTERNAL_SERVER_ERROR),
    DatabaseConfig(String, "E008", "Database Configuration Error", INTERNAL_SERVER_ERROR),
    DatabaseConnection(String, "E009", "Database Connection Error", INTERNAL_SERVER_ERROR),
    DatabaseOperation(String, "E010", "Database Operation Error", INTERNAL_SERVER_ERROR),
    FileOperation(String, "E011", "File Operation Error", INTERNAL_SERVER_ERROR),
    Serialization(String, "E012", "Serialization Error", INTERNAL_SERVER_ERROR),
    Internal(String, "E013", "Internal Error", INTERNAL_SERVER_ERROR),
}

impl ElearningError {
    /// 是否为服务端内部错误（详情只记录日志，不返回客户端）
    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }

    /// 响应体中使用的业务错误码
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ElearningError::Validation(_) => ErrorCode::BadRequest,
            ElearningError::Authentication(AuthFailure::InvalidCredentials) => ErrorCode::AuthFailed,
            ElearningError::Authentication(_) => ErrorCode::Unauthorized,
            ElearningError::Authorization(AccessDenied::Forbidden) => ErrorCode::Forbidden,
            ElearningError::Authorization(AccessDenied::NotEnrolled) => ErrorCode::NotEnrolled,
            ElearningError::NotFound(_) => ErrorCode::NotFound,
            ElearningError::Conflict(ConflictKind::AlreadySubmitted) => {
                ErrorCode::SubmissionAlreadyExists
            }
            ElearningError::Conflict(ConflictKind::DuplicateEmail) => {
                ErrorCode::EmailAlreadyExists
            }
            ElearningError::Integrity(_) => ErrorCode::IntegrityViolation,
            _ => ErrorCode::InternalServerError,
        }
    }

    /// 返回给客户端的消息
    ///
    /// 令牌校验失败统一为 "Unauthorized"，角色不符统一为 "Forbidden"，
    /// 不暴露究竟是哪一步校验失败。
    pub fn client_message(&self) -> String {
        match self {
            ElearningError::Authentication(AuthFailure::InvalidCredentials) => {
                "Invalid email or password".to_string()
            }
            ElearningError::Authentication(_) => "Unauthorized".to_string(),
            ElearningError::Authorization(AccessDenied::Forbidden) => "Forbidden".to_string(),
            err if err.is_internal() => "Internal server error".to_string(),
            err => err.message(),
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ElearningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ElearningError {}

impl ResponseError for ElearningError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            tracing::error!("[{}] {}", self.code(), self.format_simple());
        }

        let mut body = ApiResponse::<()>::error_empty(self.error_code(), self.client_message());
        if let ElearningError::Validation(detail) = self {
            body.errors = Some(vec![detail.clone()]);
        }

        HttpResponse::build(self.status()).json(body)
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ElearningError {
    fn from(err: sea_orm::DbErr) -> Self {
        ElearningError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ElearningError {
    fn from(err: std::io::Error) -> Self {
        ElearningError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ElearningError {
    fn from(err: serde_json::Error) -> Self {
        ElearningError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ElearningError {
    fn from(err: config::ConfigError) -> Self {
        ElearningError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ElearningError>;
