//! 身份服务：签发与校验令牌
//!
//! 无状态，只依赖签名密钥。签发与校验都提供 `_at` 版本，
//! 由调用方传入当前时间，便于测试边界。

pub mod token;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::CoreSettings;

pub struct IdentityService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    token_ttl: chrono::Duration,
}

impl IdentityService {
    pub fn new(settings: &CoreSettings) -> Self {
        let secret = settings.signing_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: settings.issuer.clone(),
            token_ttl: settings.token_ttl,
        }
    }

    /// 令牌有效期（秒）
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.num_seconds()
    }
}
