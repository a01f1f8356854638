use serde::Deserialize;
use ts_rs::TS;

/// 按科目筛选作业（学生视角）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListQuery {
    pub subject_id: i64,
}
