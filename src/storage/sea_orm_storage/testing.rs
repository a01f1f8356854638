//! 测试辅助：内存 SQLite 存储与基础数据

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::SqlxSqliteConnector;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::SeaOrmStorage;
use crate::models::{
    assignments::entities::{Assignment, NewAssignment},
    classes::entities::{Class, NewClass},
    principals::{
        entities::{Student, Teacher},
        requests::{NewStudent, NewTeacher},
    },
    subjects::entities::{NewSubject, Subject},
};
use crate::config::Argon2Config;
use crate::storage::Storage;
use crate::utils::password::hash_password;

/// 测试账号的统一密码
pub(crate) const PASSWORD: &str = "rahasia-123";

// 低开销参数，只用于测试
pub(crate) fn password_hash() -> String {
    let params = Argon2Config {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    };
    hash_password(PASSWORD, &params).unwrap()
}

/// 单连接的内存数据库，连接不回收以免数据丢失
pub(crate) async fn memory_storage() -> SeaOrmStorage {
    let opt = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opt)
        .await
        .unwrap();
    SeaOrmStorage::from_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
        .await
        .unwrap()
}

/// 一位教师、一个班级、一个科目、班里一名学生、一名未分班学生
pub(crate) struct School {
    pub storage: Arc<SeaOrmStorage>,
    pub teacher: Teacher,
    pub class: Class,
    pub subject: Subject,
    pub student: Student,
    pub unassigned: Student,
}

impl School {
    pub async fn new() -> Self {
        let storage = Arc::new(memory_storage().await);
        let teacher = add_teacher(&storage, "Budi", "budi@school.test").await;
        let class = add_class(&storage, "7A", teacher.id).await;
        let subject = storage
            .create_subject(NewSubject {
                name: "Mathematics".into(),
                description: None,
            })
            .await
            .unwrap();
        let student = add_student(&storage, "Citra", "citra@school.test", Some(class.id)).await;
        let unassigned = add_student(&storage, "Dewi", "dewi@school.test", None).await;

        School {
            storage,
            teacher,
            class,
            subject,
            student,
            unassigned,
        }
    }

    pub async fn assignment(&self, title: &str, deadline: DateTime<Utc>) -> Assignment {
        add_assignment(&self.storage, self.subject.id, self.class.id, title, deadline).await
    }
}

pub(crate) async fn add_teacher(storage: &SeaOrmStorage, name: &str, email: &str) -> Teacher {
    storage
        .create_teacher(NewTeacher {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash(),
            phone: None,
        })
        .await
        .unwrap()
}

pub(crate) async fn add_class(storage: &SeaOrmStorage, name: &str, teacher_id: i64) -> Class {
    storage
        .create_class(NewClass {
            name: name.into(),
            grade_level: 7,
            teacher_id,
        })
        .await
        .unwrap()
}

pub(crate) async fn add_student(
    storage: &SeaOrmStorage,
    name: &str,
    email: &str,
    class_id: Option<i64>,
) -> Student {
    storage
        .create_student(NewStudent {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash(),
            phone: None,
            class_id,
        })
        .await
        .unwrap()
}

pub(crate) async fn add_assignment(
    storage: &SeaOrmStorage,
    subject_id: i64,
    class_id: i64,
    title: &str,
    deadline: DateTime<Utc>,
) -> Assignment {
    storage
        .create_assignment(NewAssignment {
            subject_id,
            class_id,
            title: title.into(),
            description: None,
            deadline,
        })
        .await
        .unwrap()
}

pub(crate) fn at(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap()
}
