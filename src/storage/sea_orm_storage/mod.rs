//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod academics;
mod principals;
mod submissions;
#[cfg(test)]
pub(crate) mod testing;

use crate::config::DatabaseConfig;
use crate::errors::{ConflictKind, ElearningError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);
        Ok(storage)
    }

    /// 使用现有连接，运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| ElearningError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + 外键约束）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ElearningError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                ElearningError::database_connection(format!("SQLite 连接失败: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            ElearningError::database_connection(format!("无法连接到数据库: {e}"))
        })
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ElearningError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 约束违例分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

pub(crate) fn violation_of(err: &DbErr) -> Option<Violation> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Some(Violation::Unique),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => Some(Violation::ForeignKey),
        _ => None,
    }
}

/// 创建记录时的错误映射，唯一约束命中时返回 `on_unique`
pub(crate) fn map_create_error(err: DbErr, what: &str, on_unique: ElearningError) -> ElearningError {
    match violation_of(&err) {
        Some(Violation::Unique) => on_unique,
        Some(Violation::ForeignKey) => {
            ElearningError::integrity(format!("{what} references a missing record"))
        }
        None => ElearningError::database_operation(format!("创建{what}失败: {err}")),
    }
}

pub(crate) fn duplicate_email() -> ElearningError {
    ElearningError::conflict(ConflictKind::DuplicateEmail)
}

// Storage trait 实现
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
use crate::storage::{Storage, SubmissionInsert};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 账号模块
    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin> {
        self.create_admin_impl(admin).await
    }

    async fn count_admins(&self) -> Result<u64> {
        self.count_admins_impl().await
    }

    async fn get_admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        self.get_admin_by_email_impl(email).await
    }

    async fn create_teacher(&self, teacher: NewTeacher) -> Result<Teacher> {
        self.create_teacher_impl(teacher).await
    }

    async fn get_teacher_by_email(&self, email: &str) -> Result<Option<Teacher>> {
        self.get_teacher_by_email_impl(email).await
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        self.get_student_by_email_impl(email).await
    }

    async fn list_students_by_class_ids(&self, class_ids: &[i64]) -> Result<Vec<Student>> {
        self.list_students_by_class_ids_impl(class_ids).await
    }

    // 班级、科目与作业模块
    async fn create_class(&self, class: NewClass) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn list_classes_by_teacher(&self, teacher_id: i64) -> Result<Vec<Class>> {
        self.list_classes_by_teacher_impl(teacher_id).await
    }

    async fn create_subject(&self, subject: NewSubject) -> Result<Subject> {
        self.create_subject_impl(subject).await
    }

    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_by_class(&self, class_id: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_class_impl(class_id, None).await
    }

    async fn list_assignments_by_class_and_subject(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_by_class_impl(class_id, Some(subject_id))
            .await
    }

    async fn list_assignments_by_subject(&self, subject_id: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_subject_impl(subject_id).await
    }

    // 提交模块
    async fn find_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        self.find_submission_impl(assignment_id, student_id).await
    }

    async fn insert_submission(&self, submission: NewSubmission) -> Result<SubmissionInsert> {
        self.insert_submission_impl(submission).await
    }

    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_by_student_impl(student_id).await
    }

    async fn list_submissions_by_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_assignments_impl(assignment_ids)
            .await
    }
}
