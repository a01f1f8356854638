/*!
 * 基于角色的访问控制中间件
 *
 * 必须在 RequireJWT 之后执行（actix 中后 wrap 的先执行，
 * 所以写在 RequireJWT 之前）。只读取身份声明，不修改任何状态。
 *
 * ```rust,ignore
 * .wrap(RequireRole::new_any(&[Role::Student]))
 * .wrap(RequireRole::new_any(Role::admin_roles()))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::errors::{AccessDenied, AuthFailure, ElearningError};
use crate::models::principals::entities::{IdentityClaims, Role};

#[derive(Clone)]
pub struct RequireRole {
    allowed_roles: Vec<Role>,
}

impl RequireRole {
    /// 任一角色即可通过
    pub fn new_any(roles: &[Role]) -> Self {
        Self {
            allowed_roles: roles.to_vec(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Vec<Role>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            let role = req.extensions().get::<IdentityClaims>().map(|c| c.role);

            let denied = match role {
                Some(role) if allowed_roles.contains(&role) => None,
                Some(role) => {
                    info!(
                        "Access denied for role {} on {}. Allowed roles: {:?}",
                        role,
                        req.path(),
                        allowed_roles
                    );
                    Some(ElearningError::authorization(AccessDenied::Forbidden))
                }
                None => {
                    info!(
                        "Role check failed: no identity claims on {}. Make sure RequireJWT runs first.",
                        req.path()
                    );
                    Some(ElearningError::authentication(AuthFailure::NoContext))
                }
            };

            match denied {
                None => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(err) => Ok(req.into_response(err.error_response().map_into_right_body())),
            }
        })
    }
}
