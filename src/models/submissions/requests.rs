use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use super::entities::SubmissionStatus;

/// 上传的作业文件（multipart 解析后）
#[derive(Debug, Clone)]
pub struct ArtifactUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// 写入存储层的新提交
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: i64,
    pub student_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub artifact_ref: String,
}

/// 教师查看提交情况的查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct ClassSubmissionsQuery {
    pub subject_id: i64,
}
