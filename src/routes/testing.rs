//! 路由测试辅助：内存存储 + 临时文件目录组装出的完整应用

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;

use crate::config::AppConfig;
use crate::models::principals::entities::{Identity, Role};
use crate::runtime::lifetime::startup::StartupContext;
use crate::storage::sea_orm_storage::testing::School;
use crate::storage::{ArtifactStore, LocalArtifactStore};

pub(crate) struct TestBackend {
    pub school: School,
    pub context: StartupContext,
    pub dir: tempfile::TempDir,
}

impl TestBackend {
    pub async fn new() -> Self {
        let school = School::new().await;
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().to_string_lossy().to_string();
        let config = AppConfig::from_overrides(&[
            ("jwt.secret", "route-secret"),
            ("app.base_url", "http://school.test"),
            ("upload.dir", upload_dir.as_str()),
            ("upload.max_size", "64"),
        ])
        .unwrap();

        let artifacts: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::new(dir.path()));
        let context = StartupContext::assemble(&config, school.storage.clone(), artifacts);
        TestBackend {
            school,
            context,
            dir,
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        self.context.configure_app(cfg);
    }

    /// 直接签发令牌，跳过登录
    pub fn token(&self, id: i64, email: &str, role: Role) -> String {
        self.context
            .identity
            .issue_token_at(
                &Identity {
                    id,
                    email: email.into(),
                    role,
                },
                Utc::now(),
            )
            .unwrap()
    }

    pub fn student_token(&self) -> String {
        let student = &self.school.student;
        self.token(student.id, &student.email, Role::Student)
    }

    pub fn teacher_token(&self) -> String {
        let teacher = &self.school.teacher;
        self.token(teacher.id, &teacher.email, Role::Teacher)
    }
}

/// 手工拼装 multipart/form-data 请求体
pub(crate) fn multipart_body(
    boundary: &str,
    assignment_id: Option<&str>,
    files: &[(&str, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(id) = assignment_id {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"assignment_id\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
