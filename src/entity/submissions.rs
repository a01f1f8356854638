//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub submitted_at: i64,
    pub status: String,
    pub artifact_ref: String,
    pub grade: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 状态列无法识别时返回数据库错误
    pub fn into_submission(
        self,
    ) -> crate::errors::Result<crate::models::submissions::entities::Submission> {
        use crate::errors::ElearningError;
        use crate::models::submissions::entities::{Submission, SubmissionStatus};

        let status = self.status.parse::<SubmissionStatus>().map_err(|_| {
            ElearningError::database_operation(format!(
                "Invalid submission status '{}' for submission {}",
                self.status, self.id
            ))
        })?;

        Ok(Submission {
            id: self.id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            submitted_at: super::from_timestamp(self.submitted_at),
            status,
            artifact_ref: self.artifact_ref,
            grade: self.grade,
            feedback: self.feedback,
        })
    }
}
