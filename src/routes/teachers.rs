use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RequireJWT, RequireRole};
use crate::models::ApiResponse;
use crate::models::principals::entities::Role;
use crate::models::submissions::requests::ClassSubmissionsQuery;
use crate::services::CompletionAggregator;

// 教师所带班级在某科目下的提交情况
pub async fn list_class_submissions(
    req: HttpRequest,
    completion: web::Data<CompletionAggregator>,
    query: web::Query<ClassSubmissionsQuery>,
) -> ActixResult<HttpResponse> {
    let claims = RequireJWT::extract_claims(&req)?;
    let entries = completion
        .class_view(claims.subject_id, query.subject_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(entries, "Submissions retrieved")))
}

// 配置路由
pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teachers/me")
            .wrap(RequireRole::new_any(&[Role::Teacher]))
            .wrap(middlewares::RequireJWT)
            .route("/submissions", web::get().to(list_class_submissions)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, http::header::AUTHORIZATION, test};
    use chrono::{Duration, Utc};

    use crate::models::principals::entities::Role;
    use crate::models::submissions::{
        entities::SubmissionStatus, requests::NewSubmission,
    };
    use crate::routes::testing::TestBackend;
    use crate::storage::Storage;

    fn get(uri: &str, token: Option<&str>) -> actix_web::test::TestRequest {
        let mut req = test::TestRequest::get().uri(uri);
        if let Some(token) = token {
            req = req.insert_header((AUTHORIZATION, format!("Bearer {token}")));
        }
        req
    }

    #[actix_web::test]
    async fn test_gate_matrix() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;
        let uri = format!(
            "/api/v1/teachers/me/submissions?subject_id={}",
            backend.school.subject.id
        );
        let admin = backend.token(1, "root@school.test", Role::Admin);

        let cases = [
            (None, StatusCode::UNAUTHORIZED),
            (Some(backend.student_token()), StatusCode::FORBIDDEN),
            (Some(admin), StatusCode::FORBIDDEN),
            (Some(backend.teacher_token()), StatusCode::OK),
        ];
        for (token, expected) in cases {
            let resp =
                test::call_service(&app, get(&uri, token.as_deref()).to_request()).await;
            assert_eq!(resp.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_missing_subject_id_is_bad_request() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;
        let token = backend.teacher_token();

        let resp = test::call_service(
            &app,
            get("/api/v1/teachers/me/submissions", Some(&token)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_lists_submissions_of_own_students() {
        let backend = TestBackend::new().await;
        let school = &backend.school;
        let now = Utc::now();
        let assignment = school.assignment("Essay", now - Duration::hours(1)).await;
        school
            .storage
            .insert_submission(NewSubmission {
                assignment_id: assignment.id,
                student_id: school.student.id,
                submitted_at: now,
                status: SubmissionStatus::Late,
                artifact_ref: "http://school.test/static/essay.pdf".into(),
            })
            .await
            .unwrap();

        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;
        let uri = format!("/api/v1/teachers/me/submissions?subject_id={}", school.subject.id);
        let resp = test::call_service(
            &app,
            get(&uri, Some(&backend.teacher_token())).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["student_name"], "Citra");
        assert_eq!(entries[0]["status"], "late");
        assert!(entries[0]["grade"].is_null());
    }
}
