use std::sync::Arc;

use actix_web::web;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, UploadConfig};
use crate::errors::{ElearningError, Result};
use crate::middlewares::RateLimit;
use crate::models::principals::{entities::Role, requests::NewAdmin};
use crate::routes;
use crate::services::{AuthService, CompletionAggregator, IdentityService, SubmissionEngine};
use crate::storage::{ArtifactStore, LocalArtifactStore, Storage};
use crate::utils::password::hash_password;
use crate::utils::{json_error_handler, query_error_handler};

/// 种子管理员的默认邮箱
const DEFAULT_ADMIN_EMAIL: &str = "admin@school.local";

/// 服务器运行所需的全部共享对象
///
/// 在 `HttpServer::new` 闭包外构造一次，各 worker 共享同一份。
pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub identity: web::Data<IdentityService>,
    pub auth: web::Data<AuthService>,
    pub submissions: web::Data<SubmissionEngine>,
    pub completion: web::Data<CompletionAggregator>,
    pub artifacts: web::Data<dyn ArtifactStore>,
    pub upload: web::Data<UploadConfig>,
    pub login_limit: RateLimit,
}

impl StartupContext {
    /// 由配置与存储组装各服务
    pub fn assemble(
        config: &AppConfig,
        storage: Arc<dyn Storage>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        let settings = config.core_settings();
        let identity = Arc::new(IdentityService::new(&settings));
        let auth = AuthService::new(storage.clone(), identity.clone());
        let submissions = SubmissionEngine::new(storage.clone(), artifacts.clone(), &settings);
        let completion = CompletionAggregator::new(storage.clone());

        StartupContext {
            storage,
            identity: web::Data::from(identity),
            auth: web::Data::new(auth),
            submissions: web::Data::new(submissions),
            completion: web::Data::new(completion),
            artifacts: web::Data::from(artifacts),
            upload: web::Data::new(config.upload.clone()),
            login_limit: RateLimit::login(&config.rate_limit),
        }
    }

    /// 注册应用数据、参数错误处理器与全部路由
    pub fn configure_app(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(self.identity.clone())
            .app_data(self.auth.clone())
            .app_data(self.submissions.clone())
            .app_data(self.completion.clone())
            .app_data(self.artifacts.clone())
            .app_data(self.upload.clone());
        routes::configure_routes(cfg, &self.login_limit);
    }
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化超级管理员账号
///
/// 数据库中没有任何管理员时创建一个 super_admin。
pub async fn seed_admin(storage: &Arc<dyn Storage>, config: &AppConfig) -> Result<()> {
    let count = storage.count_admins().await?;
    if count > 0 {
        debug!("Database already has {} admin(s), skipping admin seed", count);
        return Ok(());
    }
    info!("No admins found in database, creating super admin account...");

    let email = std::env::var("ADMIN_EMAIL")
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let admin = storage
        .create_admin(NewAdmin {
            name: "Administrator".to_string(),
            email,
            password_hash: hash_password(&password, &config.argon2)?,
            role: Role::SuperAdmin,
            phone: None,
        })
        .await?;
    info!(
        "Super admin account created (ID: {}, email: {})",
        admin.id, admin.email
    );
    Ok(())
}

/// 准备服务器启动的上下文
/// 包括加密提供者、存储与迁移、种子管理员
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| ElearningError::internal("Failed to install rustls crypto provider"))?;

    let storage = crate::storage::create_storage(&config.database).await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage, config).await?;

    let artifacts: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::new(&config.upload.dir));
    warn!("Artifacts stored under {}", config.upload.dir);

    Ok(StartupContext::assemble(config, storage, artifacts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::memory_storage;

    #[test]
    fn test_generated_password_length_and_charset() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.chars().count(), 16);
        assert!(pwd.chars().all(|c| c.is_ascii_graphic()));
    }

    #[tokio::test]
    async fn test_seed_admin_runs_once() {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);
        let mut config = AppConfig::from_overrides(&[("jwt.secret", "seed")]).unwrap();
        config.argon2.memory_cost = 1024;
        config.argon2.time_cost = 1;

        seed_admin(&storage, &config).await.unwrap();
        seed_admin(&storage, &config).await.unwrap();
        assert_eq!(storage.count_admins().await.unwrap(), 1);
    }
}
