use std::collections::HashMap;

use super::CompletionAggregator;
use crate::errors::Result;
use crate::models::submissions::responses::ClassCompletionEntry;

impl CompletionAggregator {
    /// 教师视角：某科目下、教师所带班级学生的全部提交
    ///
    /// 排序：截止时间倒序，学生姓名升序，提交ID升序。
    pub async fn class_view(
        &self,
        teacher_id: i64,
        subject_id: i64,
    ) -> Result<Vec<ClassCompletionEntry>> {
        let class_ids: Vec<i64> = self
            .storage
            .list_classes_by_teacher(teacher_id)
            .await?
            .into_iter()
            .map(|class| class.id)
            .collect();
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let students: HashMap<i64, String> = self
            .storage
            .list_students_by_class_ids(&class_ids)
            .await?
            .into_iter()
            .map(|student| (student.id, student.name))
            .collect();
        if students.is_empty() {
            return Ok(Vec::new());
        }

        let assignments: HashMap<i64, _> = self
            .storage
            .list_assignments_by_subject(subject_id)
            .await?
            .into_iter()
            .map(|assignment| (assignment.id, assignment))
            .collect();
        let assignment_ids: Vec<i64> = assignments.keys().copied().collect();

        let mut entries: Vec<ClassCompletionEntry> = self
            .storage
            .list_submissions_by_assignments(&assignment_ids)
            .await?
            .into_iter()
            .filter_map(|submission| {
                let student_name = students.get(&submission.student_id)?;
                let assignment = assignments.get(&submission.assignment_id)?;
                Some(ClassCompletionEntry {
                    submission_id: submission.id,
                    assignment_id: assignment.id,
                    assignment_title: assignment.title.clone(),
                    deadline: assignment.deadline,
                    student_id: submission.student_id,
                    student_name: student_name.clone(),
                    submitted_at: submission.submitted_at,
                    status: submission.status,
                    artifact_ref: submission.artifact_ref,
                    grade: submission.grade,
                    feedback: submission.feedback,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.deadline
                .cmp(&a.deadline)
                .then_with(|| a.student_name.cmp(&b.student_name))
                .then_with(|| a.submission_id.cmp(&b.submission_id))
        });

        Ok(entries)
    }
}
