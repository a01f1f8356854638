pub mod login;

use std::sync::Arc;

use crate::services::IdentityService;
use crate::storage::Storage;

/// 登录服务：按账号类型查找、校验密码并签发令牌
pub struct AuthService {
    storage: Arc<dyn Storage>,
    identity: Arc<IdentityService>,
}

impl AuthService {
    pub fn new(storage: Arc<dyn Storage>, identity: Arc<IdentityService>) -> Self {
        Self { storage, identity }
    }
}
