use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};

use super::IdentityService;
use crate::errors::{AuthFailure, ElearningError, Result};
use crate::models::principals::entities::{Identity, IdentityClaims, Role};

impl IdentityService {
    /// 签发令牌，有效期从当前时间起算
    pub fn issue_token(&self, identity: &Identity) -> Result<String> {
        self.issue_token_at(identity, Utc::now())
    }

    /// 按给定时间签发令牌；同一时间与密钥下结果确定
    pub fn issue_token_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = IdentityClaims {
            sub: identity.id.to_string(),
            subject_id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat,
            exp: iat + self.token_ttl.num_seconds(),
            aud: identity.role.as_str().to_string(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ElearningError::internal(format!("令牌签发失败: {e}")))
    }

    /// 校验令牌
    pub fn validate_token(&self, token: &str) -> Result<IdentityClaims> {
        self.validate_token_at(token, Utc::now())
    }

    /// 校验签名、算法族与有效期；`now >= exp` 即视为过期
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                let failure = match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidAlgorithmName => AuthFailure::BadSignature,
                    ErrorKind::ExpiredSignature => AuthFailure::Expired,
                    _ => AuthFailure::Malformed,
                };
                ElearningError::authentication(failure)
            })?;

        let claims = data.claims;
        if claims.aud != claims.role.as_str() || claims.sub != claims.subject_id.to_string() {
            return Err(ElearningError::authentication(AuthFailure::Malformed));
        }
        if now.timestamp() >= claims.exp {
            return Err(ElearningError::authentication(AuthFailure::Expired));
        }

        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // 只接受 HMAC 族
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // 过期按秒精确判断，不使用库的宽限
        validation.validate_exp = false;
        validation.leeway = 0;
        let audiences: Vec<&str> = Role::all_roles().iter().map(|r| r.as_str()).collect();
        validation.set_audience(&audiences);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreSettings;
    use chrono::Duration;

    fn service(secret: &str) -> IdentityService {
        IdentityService::new(&CoreSettings::new(secret, "http://localhost:8080"))
    }

    fn teacher() -> Identity {
        Identity {
            id: 42,
            email: "budi@school.test".into(),
            role: Role::Teacher,
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn failure(err: ElearningError) -> AuthFailure {
        match err {
            ElearningError::Authentication(failure) => failure,
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip() {
        let svc = service("secret-a");
        let token = svc.issue_token_at(&teacher(), t0()).unwrap();
        let claims = svc.validate_token_at(&token, t0()).unwrap();

        assert_eq!(claims.subject_id, 42);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "budi@school.test");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.aud, "teacher");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let svc = service("secret-a");
        let a = svc.issue_token_at(&teacher(), t0()).unwrap();
        let b = svc.issue_token_at(&teacher(), t0()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expiry_boundary() {
        let svc = service("secret-a");
        let token = svc.issue_token_at(&teacher(), t0()).unwrap();
        let expiry = t0() + Duration::hours(24);

        assert!(svc.validate_token_at(&token, expiry - Duration::seconds(1)).is_ok());
        assert_eq!(
            failure(svc.validate_token_at(&token, expiry).unwrap_err()),
            AuthFailure::Expired
        );
        assert_eq!(
            failure(
                svc.validate_token_at(&token, expiry + Duration::seconds(1))
                    .unwrap_err()
            ),
            AuthFailure::Expired
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = service("secret-a").issue_token_at(&teacher(), t0()).unwrap();
        let err = service("secret-b").validate_token_at(&token, t0()).unwrap_err();
        assert_eq!(failure(err), AuthFailure::BadSignature);
    }

    #[test]
    fn test_non_hmac_header_is_bad_signature() {
        let svc = service("secret-a");
        let token = svc.issue_token_at(&teacher(), t0()).unwrap();
        let mut parts = token.splitn(3, '.');
        let _header = parts.next().unwrap();
        let payload = parts.next().unwrap();
        let signature = parts.next().unwrap();
        // {"alg":"RS256","typ":"JWT"}
        let forged = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.{signature}");

        let err = svc.validate_token_at(&forged, t0()).unwrap_err();
        assert_eq!(failure(err), AuthFailure::BadSignature);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let svc = service("secret-a");
        for token in ["", "abc", "a.b.c", "not a token at all"] {
            let err = svc.validate_token_at(token, t0()).unwrap_err();
            assert_eq!(failure(err), AuthFailure::Malformed, "token: {token:?}");
        }
    }
}
