// 业务错误码，随响应体的 `code` 字段返回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证相关 2xxx
    AuthFailed = 2000,
    EmailAlreadyExists = 2001,
    IntegrityViolation = 2002,

    // 作业与提交相关 3xxx
    AssignmentNotFound = 3000,
    NotEnrolled = 3001,
    SubmissionAlreadyExists = 3002,
    FileTypeNotAllowed = 3003,
    FileSizeExceeded = 3004,
    MultifileUploadNotAllowed = 3005,
}
