use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::models::{
    assignments::entities::{Assignment, NewAssignment},
    classes::entities::{Class, NewClass},
    principals::{
        entities::{Admin, Student, Teacher},
        requests::{NewAdmin, NewStudent, NewTeacher},
    },
    subjects::entities::{NewSubject, Subject},
    submissions::{entities::Submission, requests::NewSubmission},
};

pub mod artifacts;
pub mod sea_orm_storage;

pub use artifacts::{ArtifactStore, LocalArtifactStore};

/// 插入提交的结果
///
/// 唯一约束 `(assignment_id, student_id)` 命中时返回 `Conflict`，
/// 其他数据库错误仍然走 `Err`。
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionInsert {
    Created(Submission),
    Conflict,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 账号管理方法
    // 创建管理员
    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin>;
    // 管理员数量（启动时判断是否需要初始化）
    async fn count_admins(&self) -> Result<u64>;
    // 通过邮箱获取管理员
    async fn get_admin_by_email(&self, email: &str) -> Result<Option<Admin>>;
    // 创建教师
    async fn create_teacher(&self, teacher: NewTeacher) -> Result<Teacher>;
    // 通过邮箱获取教师
    async fn get_teacher_by_email(&self, email: &str) -> Result<Option<Teacher>>;
    // 创建学生
    async fn create_student(&self, student: NewStudent) -> Result<Student>;
    // 通过ID获取学生
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    // 通过邮箱获取学生
    async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>>;
    // 列出若干班级的学生
    async fn list_students_by_class_ids(&self, class_ids: &[i64]) -> Result<Vec<Student>>;

    /// 班级、科目与作业
    async fn create_class(&self, class: NewClass) -> Result<Class>;
    // 教师负责的班级
    async fn list_classes_by_teacher(&self, teacher_id: i64) -> Result<Vec<Class>>;
    async fn create_subject(&self, subject: NewSubject) -> Result<Subject>;
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 班级的全部作业，按截止时间倒序
    async fn list_assignments_by_class(&self, class_id: i64) -> Result<Vec<Assignment>>;
    // 班级在某科目下的作业，按截止时间倒序
    async fn list_assignments_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Assignment>>;
    // 某科目下的全部作业
    async fn list_assignments_by_subject(&self, subject_id: i64) -> Result<Vec<Assignment>>;

    /// 提交管理方法
    async fn find_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    // 插入提交，唯一约束冲突返回 SubmissionInsert::Conflict
    async fn insert_submission(&self, submission: NewSubmission) -> Result<SubmissionInsert>;
    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>>;
    async fn list_submissions_by_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>>;
}

pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::connect(config).await?;
    Ok(Arc::new(storage))
}
