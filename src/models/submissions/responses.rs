use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::entities::{Submission, SubmissionStatus};

/// 学生视角的完成情况：每个作业一项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct StudentCompletionEntry {
    pub assignment_id: i64,
    pub subject_id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub submission: Option<Submission>,
}

/// 教师视角的完成情况：每条提交一项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct ClassCompletionEntry {
    pub submission_id: i64,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub deadline: DateTime<Utc>,
    pub student_id: i64,
    pub student_name: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub artifact_ref: String,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}
