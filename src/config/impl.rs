use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};

use super::{AppConfig, CoreSettings};

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Self::with_defaults(Config::builder())?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(File::with_name(&format!("config.{environment}")).required(false))
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("ELEARNING")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从常用环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("app.base_url", std::env::var("BASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("upload.dir", std::env::var("UPLOAD_DIR").ok())?;

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.normalize()?;
        Ok(app_config)
    }

    /// 内置默认值，除签名密钥外所有键都有默认值
    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("app.system_name", "School E-Learning")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("app.base_url", "http://localhost:8080")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 16)?
            .set_default("server.timeouts.client_request", 5000)?
            .set_default("server.timeouts.client_disconnect", 1000)?
            .set_default("server.timeouts.keep_alive", 30000)?
            .set_default("server.timeouts.shutdown", 30)?
            .set_default("server.limits.max_payload_size", 16 * 1024 * 1024)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.issuer", "school-elearning")?
            .set_default("jwt.token_ttl", 24 * 60 * 60)?
            .set_default("argon2.memory_cost", 19456)?
            .set_default("argon2.time_cost", 2)?
            .set_default("argon2.parallelism", 1)?
            .set_default("database.url", "sqlite://elearning.db?mode=rwc")?
            .set_default("database.pool_size", 10)?
            .set_default("database.timeout", 30)?
            .set_default("cors.allowed_origins", vec!["*"])?
            .set_default("cors.allowed_methods", vec!["GET", "POST", "OPTIONS"])?
            .set_default(
                "cors.allowed_headers",
                vec!["Authorization", "Content-Type", "Accept"],
            )?
            .set_default("cors.max_age", 3600)?
            .set_default("upload.dir", "uploads")?
            .set_default("upload.max_size", 10 * 1024 * 1024)?
            .set_default(
                "upload.allowed_types",
                vec![".pdf", ".doc", ".docx", ".txt", ".zip", ".png", ".jpg", ".jpeg"],
            )?
            .set_default("rate_limit.login_max_requests", 5)?
            .set_default("rate_limit.login_window_secs", 60)
    }

    /// 校验并补全派生值
    fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set (JWT_SECRET)".to_string(),
            ));
        }
        if self.jwt.token_ttl <= 0 {
            return Err(ConfigError::Message(
                "jwt.token_ttl must be positive".to_string(),
            ));
        }

        // 处理工作线程数
        if self.server.workers == 0 {
            self.server.workers = num_cpus::get().min(self.server.max_workers);
        }

        // 去掉末尾斜杠，拼接地址时统一补
        let trimmed = self.app.base_url.trim_end_matches('/').len();
        self.app.base_url.truncate(trimmed);
        Ok(())
    }

    /// 核心服务使用的配置投影
    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            signing_secret: self.jwt.secret.clone(),
            issuer: self.jwt.issuer.clone(),
            base_url: self.app.base_url.clone(),
            token_ttl: chrono::Duration::seconds(self.jwt.token_ttl),
        }
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
impl AppConfig {
    /// 只用默认值与给定覆盖项构造，不读文件与环境变量
    pub(crate) fn from_overrides(overrides: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let mut builder = Self::with_defaults(Config::builder())?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.normalize()?;
        Ok(config)
    }
}

impl CoreSettings {
    /// 测试与工具使用的构造
    pub fn new(signing_secret: impl Into<String>, base_url: impl Into<String>) -> Self {
        CoreSettings {
            signing_secret: signing_secret.into(),
            issuer: "school-elearning".to_string(),
            base_url: base_url.into(),
            token_ttl: chrono::Duration::hours(24),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        AppConfig::from_overrides(overrides)
    }

    #[test]
    fn test_defaults_need_only_secret() {
        let config = build(&[("jwt.secret", "s3cret")]).unwrap();
        assert_eq!(config.jwt.token_ttl, 86400);
        assert_eq!(config.server.port, 8080);
        assert!(config.server.workers >= 1);
        assert_eq!(config.core_settings().token_ttl, chrono::Duration::hours(24));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(build(&[]).is_err());
        assert!(build(&[("jwt.secret", "   ")]).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = build(&[
            ("jwt.secret", "s3cret"),
            ("app.base_url", "https://school.example/"),
        ])
        .unwrap();
        assert_eq!(config.core_settings().base_url, "https://school.example");
    }
}
