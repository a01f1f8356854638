/*!
 * 速率限制中间件
 *
 * 用于登录端点，按客户端 IP 计数，防止暴力破解密码。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * // 在 HttpServer::new 闭包外创建一次，各 worker 克隆后共享同一缓存
 * let login_limit = RateLimit::login(&config.rate_limit);
 *
 * HttpServer::new(move || {
 *     App::new().service(
 *         web::scope("/api/v1/students")
 *             .service(web::resource("/login").wrap(login_limit.clone()).route(web::post().to(login)))
 *     )
 * })
 * ```
 *
 * 超过限制返回 429 Too Many Requests。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::models::principals::entities::IdentityClaims;
use crate::models::{ApiResponse, ErrorCode};

/// 速率限制配置
///
/// 克隆后共享同一个计数缓存。
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
    /// 键: 前缀:标识，值: 请求计数
    counters: Cache<String, u32>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
            counters: Cache::builder()
                .time_to_live(Duration::from_secs(window_secs))
                .max_capacity(100_000)
                .build(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录端点限制，默认 5次/分钟/IP
    pub fn login(config: &RateLimitConfig) -> Self {
        Self::new(config.login_max_requests, config.login_window_secs).with_prefix("login")
    }
}

/// 从请求中提取客户端 IP
///
/// 优先使用连接信息；部署在反向代理后面时，需要代理正确设置转发头。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 只取 X-Forwarded-For 的第一个 IP
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<std::net::IpAddr>().is_ok()
}

/// 已认证请求按身份计数
fn extract_subject(req: &ServiceRequest) -> Option<String> {
    req.extensions()
        .get::<IdentityClaims>()
        .map(|claims| format!("{}:{}", claims.role, claims.subject_id))
}

fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let identifier = extract_subject(&req)
                .map(|subject| format!("user:{subject}"))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if limit.key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", limit.key_prefix, identifier)
            };

            let current_count = limit.counters.get(&cache_key).await.unwrap_or(0);

            if current_count >= limit.max_requests {
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, current_count, limit.max_requests
                );
                return Ok(req.into_response(
                    create_rate_limit_response(limit.window_secs).map_into_right_body(),
                ));
            }

            limit
                .counters
                .insert(cache_key, current_count + 1)
                .await;

            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}
