use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::{self, RateLimit, RequireJWT};
use crate::models::ApiResponse;
use crate::models::principals::{
    entities::PrincipalKind, requests::LoginRequest, responses::ProfileResponse,
};
use crate::services::AuthService;

async fn login(
    kind: PrincipalKind,
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    let response = auth.login(kind, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
}

pub async fn admin_login(
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    login(PrincipalKind::Admin, auth, body).await
}

pub async fn teacher_login(
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    login(PrincipalKind::Teacher, auth, body).await
}

pub async fn student_login(
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    login(PrincipalKind::Student, auth, body).await
}

// 当前令牌的身份信息
pub async fn profile(req: HttpRequest) -> ActixResult<HttpResponse> {
    let claims = RequireJWT::extract_claims(&req)?;
    let profile = ProfileResponse {
        subject_id: claims.subject_id,
        email: claims.email.clone(),
        role: claims.role,
        issued_at: claims.issued_at(),
        expires_at: claims.expires_at(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(profile, "Profile retrieved")))
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig, login_limit: &RateLimit) {
    cfg.service(
        web::resource("/api/v1/admins/login")
            .wrap(login_limit.clone())
            .route(web::post().to(admin_login)),
    )
    .service(
        web::resource("/api/v1/teachers/login")
            .wrap(login_limit.clone())
            .route(web::post().to(teacher_login)),
    )
    .service(
        web::resource("/api/v1/students/login")
            .wrap(login_limit.clone())
            .route(web::post().to(student_login)),
    )
    .service(
        web::resource("/api/v1/me")
            .wrap(middlewares::RequireJWT)
            .route(web::get().to(profile)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, http::header::AUTHORIZATION, test};
    use serde_json::json;

    use crate::routes::testing::TestBackend;
    use crate::storage::sea_orm_storage::testing::PASSWORD;

    #[actix_web::test]
    async fn test_login_then_profile() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/students/login")
            .peer_addr("10.1.0.1:5000".parse().unwrap())
            .set_json(json!({"email": "citra@school.test", "password": PASSWORD}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["principal"]["role"], "student");
        assert_eq!(body["data"]["expires_in"], 86400);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["email"], "citra@school.test");
        assert_eq!(body["data"]["subject_id"], backend.school.student.id);
    }

    #[actix_web::test]
    async fn test_student_cannot_log_in_as_teacher() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/teachers/login")
            .peer_addr("10.1.0.2:5000".parse().unwrap())
            .set_json(json!({"email": "citra@school.test", "password": PASSWORD}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[actix_web::test]
    async fn test_malformed_login_body_is_bad_request() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/admins/login")
            .peer_addr("10.1.0.3:5000".parse().unwrap())
            .set_json(json!({"email": "root@school.test"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_login_is_rate_limited_per_ip() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let attempt = || {
            test::TestRequest::post()
                .uri("/api/v1/students/login")
                .peer_addr("10.1.0.4:5000".parse().unwrap())
                .set_json(json!({"email": "citra@school.test", "password": "wrong"}))
                .to_request()
        };
        for _ in 0..5 {
            let resp = test::call_service(&app, attempt()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        let resp = test::call_service(&app, attempt()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn test_profile_requires_token() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/api/v1/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
