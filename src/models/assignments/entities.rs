use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    // 唯一 ID
    pub id: i64,
    // 科目
    pub subject_id: i64,
    // 布置给哪个班级
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    // 截止时间
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub subject_id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
}
