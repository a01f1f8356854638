//! 提交存储操作

use super::{SeaOrmStorage, Violation, violation_of};
use crate::entity::prelude::{SubmissionActiveModel, Submissions};
use crate::entity::submissions::Column;
use crate::errors::{ElearningError, Result};
use crate::models::submissions::{entities::Submission, requests::NewSubmission};
use crate::storage::SubmissionInsert;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn find_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 插入提交
    ///
    /// 唯一索引 `uq_submissions_assignment_student` 是去重的最终依据，
    /// 命中时返回 `SubmissionInsert::Conflict` 而不是错误。
    pub async fn insert_submission_impl(&self, req: NewSubmission) -> Result<SubmissionInsert> {
        let model = SubmissionActiveModel {
            assignment_id: Set(req.assignment_id),
            student_id: Set(req.student_id),
            submitted_at: Set(req.submitted_at.timestamp()),
            status: Set(req.status.to_string()),
            artifact_ref: Set(req.artifact_ref),
            grade: Set(None),
            feedback: Set(None),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(inserted) => Ok(SubmissionInsert::Created(inserted.into_submission()?)),
            Err(e) => match violation_of(&e) {
                Some(Violation::Unique) => Ok(SubmissionInsert::Conflict),
                Some(Violation::ForeignKey) => Err(ElearningError::integrity(
                    "Submission references a missing assignment or student",
                )),
                None => Err(ElearningError::database_operation(format!(
                    "创建提交失败: {e}"
                ))),
            },
        }
    }

    pub async fn list_submissions_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<Submission>> {
        let result = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询提交列表失败: {e}")))?;

        result.into_iter().map(|m| m.into_submission()).collect()
    }

    pub async fn list_submissions_by_assignments_impl(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Submissions::find()
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询提交列表失败: {e}")))?;

        result.into_iter().map(|m| m.into_submission()).collect()
    }
}
