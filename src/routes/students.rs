use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT, RequireRole};
use crate::models::ApiResponse;
use crate::models::assignments::requests::AssignmentListQuery;
use crate::models::principals::entities::Role;
use crate::services::CompletionAggregator;

// 学生所在班级全部作业的完成情况
pub async fn assignment_status(
    req: HttpRequest,
    completion: web::Data<CompletionAggregator>,
) -> ActixResult<HttpResponse> {
    let claims = RequireJWT::extract_claims(&req)?;
    let entries = completion.student_view(claims.subject_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        entries,
        "Assignment status retrieved",
    )))
}

// 按科目列出学生所在班级的作业
pub async fn list_assignments(
    req: HttpRequest,
    completion: web::Data<CompletionAggregator>,
    query: web::Query<AssignmentListQuery>,
) -> ActixResult<HttpResponse> {
    let claims = RequireJWT::extract_claims(&req)?;
    let assignments = completion
        .student_assignments(claims.subject_id, query.subject_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        assignments,
        "Assignments retrieved",
    )))
}

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students/me")
            .wrap(RequireRole::new_any(&[Role::Student]))
            .wrap(middlewares::RequireJWT)
            .route("/assignments", web::get().to(list_assignments))
            .route("/assignments/status", web::get().to(assignment_status)),
    );
}
