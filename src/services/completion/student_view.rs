use std::collections::HashMap;

use super::CompletionAggregator;
use crate::errors::Result;
use crate::models::assignments::entities::Assignment;
use crate::models::submissions::responses::StudentCompletionEntry;

impl CompletionAggregator {
    /// 学生所在班级每个作业一项，顺序与存储返回一致
    ///
    /// 未分班（或学生不存在）时返回空列表。
    pub async fn student_view(&self, student_id: i64) -> Result<Vec<StudentCompletionEntry>> {
        let Some(class_id) = self.class_of(student_id).await? else {
            return Ok(Vec::new());
        };

        let assignments = self.storage.list_assignments_by_class(class_id).await?;
        let mut submissions: HashMap<i64, _> = self
            .storage
            .list_submissions_by_student(student_id)
            .await?
            .into_iter()
            .map(|s| (s.assignment_id, s))
            .collect();

        let entries = assignments
            .into_iter()
            .map(|assignment| {
                let submission = submissions.remove(&assignment.id);
                StudentCompletionEntry {
                    assignment_id: assignment.id,
                    subject_id: assignment.subject_id,
                    title: assignment.title,
                    deadline: assignment.deadline,
                    is_completed: submission.is_some(),
                    submission,
                }
            })
            .collect();

        Ok(entries)
    }

    /// 学生所在班级在某科目下的作业
    pub async fn student_assignments(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Assignment>> {
        match self.class_of(student_id).await? {
            Some(class_id) => {
                self.storage
                    .list_assignments_by_class_and_subject(class_id, subject_id)
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    async fn class_of(&self, student_id: i64) -> Result<Option<i64>> {
        Ok(self
            .storage
            .get_student_by_id(student_id)
            .await?
            .and_then(|student| student.class_id))
    }
}
