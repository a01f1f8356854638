pub mod artifacts;

pub mod auth;

pub mod students;

pub mod submissions;

pub mod teachers;

use actix_web::web;

use crate::middlewares::RateLimit;

pub use artifacts::configure_artifact_routes;
pub use auth::configure_auth_routes;
pub use students::configure_student_routes;
pub use submissions::configure_submission_routes;
pub use teachers::configure_teacher_routes;

/// 注册全部路由
///
/// 登录路由必须先于 `/api/v1/students/me`、`/api/v1/teachers/me` 作用域注册。
pub fn configure_routes(cfg: &mut web::ServiceConfig, login_limit: &RateLimit) {
    configure_auth_routes(cfg, login_limit);
    configure_submission_routes(cfg);
    configure_student_routes(cfg);
    configure_teacher_routes(cfg);
    configure_artifact_routes(cfg);
}

#[cfg(test)]
pub(crate) mod testing;
