/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，成功后把 `IdentityClaims`
 * 放入请求扩展，供后续的角色校验与处理程序使用。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::{RequireJWT, RequireRole};
 * use crate::models::principals::entities::Role;
 *
 * App::new()
 *     .app_data(web::Data::new(identity_service))
 *     .service(
 *         web::scope("/api/v1/teachers")
 *             .wrap(RequireRole::new_any(&[Role::Teacher]))  // 后执行
 *             .wrap(RequireJWT)                               // 先执行
 *             .route("/me/submissions", web::get().to(handler))
 *     )
 * ```
 *
 * ## 认证流程
 *
 * 1. 缺少请求头或方案不是 Bearer：401
 * 2. 令牌无法解析、签名或算法不符、已过期：401
 * 3. 成功：写入请求扩展，继续处理
 *
 * 所有 401 响应体相同，具体原因只记录在日志中。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, info};

use crate::errors::{AuthFailure, ElearningError, Result};
use crate::models::principals::entities::IdentityClaims;
use crate::services::IdentityService;

#[derive(Clone)]
pub struct RequireJWT;

// 提取 Bearer 令牌，方案名不区分大小写
fn bearer_token(req: &ServiceRequest) -> Result<&str> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ElearningError::authentication(AuthFailure::MissingToken))?;

    match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(ElearningError::authentication(AuthFailure::MissingToken)),
    }
}

fn authenticate(req: &ServiceRequest) -> Result<IdentityClaims> {
    let identity = req
        .app_data::<web::Data<IdentityService>>()
        .ok_or_else(|| ElearningError::internal("IdentityService not registered in app data"))?;
    let token = bearer_token(req)?;
    identity.validate_token(token)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            match authenticate(&req) {
                Ok(claims) => {
                    debug!(
                        "JWT authentication successful for {} {}",
                        claims.role, claims.subject_id
                    );
                    req.extensions_mut().insert(claims);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(err.error_response().map_into_right_body()))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取身份信息
impl RequireJWT {
    /// 从请求扩展中提取身份声明
    ///
    /// 未经过 RequireJWT 的请求返回 `NoContext`。
    pub fn extract_claims(req: &HttpRequest) -> Result<IdentityClaims> {
        req.extensions()
            .get::<IdentityClaims>()
            .cloned()
            .ok_or(ElearningError::authentication(AuthFailure::NoContext))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::StatusCode, test};
    use chrono::Utc;

    use super::*;
    use crate::config::CoreSettings;
    use crate::models::principals::entities::{Identity, Role};

    fn identity_service() -> IdentityService {
        IdentityService::new(&CoreSettings::new("gate-secret", "http://localhost:8080"))
    }

    async fn whoami(req: HttpRequest) -> actix_web::Result<HttpResponse> {
        let claims = RequireJWT::extract_claims(&req)?;
        Ok(HttpResponse::Ok().body(claims.subject_id.to_string()))
    }

    #[actix_web::test]
    async fn test_missing_and_malformed_headers_are_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(identity_service()))
                .service(
                    web::scope("/p")
                        .wrap(RequireJWT)
                        .route("", web::get().to(whoami)),
                ),
        )
        .await;

        for header in [None, Some("Basic abc"), Some("Bearer"), Some("Bearer not.a.token")] {
            let mut req = test::TestRequest::get().uri("/p");
            if let Some(value) = header {
                req = req.insert_header((AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header: {header:?}");
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Unauthorized");
        }
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler() {
        let svc = identity_service();
        let token = svc
            .issue_token_at(
                &Identity {
                    id: 5,
                    email: "citra@school.test".into(),
                    role: Role::Student,
                },
                Utc::now(),
            )
            .unwrap();

        let app = test::init_service(
            App::new().app_data(web::Data::new(svc)).service(
                web::scope("/p")
                    .wrap(RequireJWT)
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/p")
            .insert_header((AUTHORIZATION, format!("bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "5");
    }

    #[actix_web::test]
    async fn test_handler_without_gate_has_no_context() {
        let app = test::init_service(App::new().route("/open", web::get().to(whoami))).await;
        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/open").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
