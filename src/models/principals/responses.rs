use serde::Serialize;
use ts_rs::TS;

use super::entities::{Identity, Role};

// 登录响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub principal: Identity,
}

// 当前身份信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct ProfileResponse {
    pub subject_id: i64,
    pub email: String,
    pub role: Role,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}
