use tracing::{info, warn};

use super::AuthService;
use crate::errors::{AuthFailure, ElearningError, Result};
use crate::models::principals::{
    entities::{Identity, PrincipalKind},
    requests::LoginRequest,
    responses::LoginResponse,
};
use crate::utils::password::verify_password;
use crate::utils::validate::validate_email;

impl AuthService {
    /// 登录
    ///
    /// 邮箱不存在与密码错误返回同一个错误，不暴露账号是否存在。
    pub async fn login(&self, kind: PrincipalKind, request: LoginRequest) -> Result<LoginResponse> {
        let email = request.email.trim().to_lowercase();
        validate_email(&email).map_err(ElearningError::validation)?;
        if request.password.is_empty() {
            return Err(ElearningError::validation("Password is required"));
        }

        // 1. 查找账号，统一投影为 (身份, 密码哈希)
        let found = match kind {
            PrincipalKind::Admin => self
                .storage
                .get_admin_by_email(&email)
                .await?
                .map(|admin| (Identity::from(&admin), admin.password_hash)),
            PrincipalKind::Teacher => self
                .storage
                .get_teacher_by_email(&email)
                .await?
                .map(|teacher| (Identity::from(&teacher), teacher.password_hash)),
            PrincipalKind::Student => self
                .storage
                .get_student_by_email(&email)
                .await?
                .map(|student| (Identity::from(&student), student.password_hash)),
        };

        // 2. 验证密码
        let identity = match found {
            Some((identity, hash)) if verify_password(&request.password, &hash) => identity,
            _ => {
                warn!("{} login failed for {}", kind, email);
                return Err(ElearningError::authentication(
                    AuthFailure::InvalidCredentials,
                ));
            }
        };

        // 3. 签发令牌
        let token = self.identity.issue_token(&identity)?;
        info!("{} {} logged in successfully", kind, identity.id);

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.identity.token_ttl_secs(),
            principal: identity,
        })
    }
}
