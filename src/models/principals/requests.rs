use serde::Deserialize;
use ts_rs::TS;

use super::entities::Role;

// 登录请求（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// 以下为存储层创建记录使用的内部结构，password_hash 已经过哈希

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub class_id: Option<i64>,
}
