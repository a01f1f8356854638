use chrono::{DateTime, SubsecRound, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ARTIFACT_CATEGORY, SubmissionEngine};
use crate::errors::{AccessDenied, ConflictKind, ElearningError, Result};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::{ArtifactUpload, NewSubmission},
};
use crate::storage::SubmissionInsert;

impl SubmissionEngine {
    pub async fn submit(
        &self,
        assignment_id: i64,
        student_id: i64,
        artifact: ArtifactUpload,
    ) -> Result<Submission> {
        self.submit_at(assignment_id, student_id, artifact, Utc::now())
            .await
    }

    /// 以给定时间提交作业
    ///
    /// 先查重只是快速路径，真正的去重依赖存储层唯一约束。
    /// 文件在插入确认前写入；插入失败时删除刚写入的文件。
    pub async fn submit_at(
        &self,
        assignment_id: i64,
        student_id: i64,
        artifact: ArtifactUpload,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        // 存储精度为秒，判定与持久化都使用截断后的同一时间
        let now = now.trunc_subsecs(0);

        // 1. 作业
        let assignment = self
            .storage
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| ElearningError::not_found(format!("Assignment {assignment_id}")))?;

        // 2. 学生必须在作业所属班级
        let student = self.storage.get_student_by_id(student_id).await?;
        let enrolled = student.is_some_and(|s| s.class_id == Some(assignment.class_id));
        if !enrolled {
            return Err(ElearningError::authorization(AccessDenied::NotEnrolled));
        }

        // 3. 快速查重
        if self
            .storage
            .find_submission(assignment_id, student_id)
            .await?
            .is_some()
        {
            return Err(ElearningError::conflict(ConflictKind::AlreadySubmitted));
        }

        // 4. 状态只在此处计算一次
        let status = SubmissionStatus::classify(now, assignment.deadline);

        // 5. 保存文件并生成地址
        let file_name = artifact_file_name(assignment_id, student_id, now, &artifact.file_name);
        let stored_path = self
            .artifacts
            .save(ARTIFACT_CATEGORY, &file_name, &artifact.bytes)
            .await?;

        let inserted = self
            .storage
            .insert_submission(NewSubmission {
                assignment_id,
                student_id,
                submitted_at: now,
                status,
                artifact_ref: self.artifact_url(&stored_path),
            })
            .await;

        // 6. 插入结果
        match inserted {
            Ok(SubmissionInsert::Created(submission)) => {
                info!(
                    "Student {} submitted assignment {} ({})",
                    student_id, assignment_id, submission.status
                );
                Ok(submission)
            }
            Ok(SubmissionInsert::Conflict) => {
                self.discard_artifact(&stored_path).await;
                warn!(
                    "Duplicate submission rejected: assignment {}, student {}",
                    assignment_id, student_id
                );
                Err(ElearningError::conflict(ConflictKind::AlreadySubmitted))
            }
            Err(e) => {
                self.discard_artifact(&stored_path).await;
                Err(e)
            }
        }
    }

    async fn discard_artifact(&self, stored_path: &str) {
        if let Err(e) = self.artifacts.remove(stored_path).await {
            warn!("Orphaned artifact left at {}: {}", stored_path, e);
        }
    }
}

/// 文件名包含作业ID、学生ID与时间戳，再加随机段避免并发重名
fn artifact_file_name(
    assignment_id: i64,
    student_id: i64,
    now: DateTime<Utc>,
    original_name: &str,
) -> String {
    let ext: String = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    let suffix = Uuid::new_v4().simple().to_string();
    let ext = if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    };

    format!(
        "assignment-{}-student-{}-{}-{}{}",
        assignment_id,
        student_id,
        now.timestamp_millis(),
        &suffix[..8],
        ext
    )
}
