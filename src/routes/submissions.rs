use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::config::UploadConfig;
use crate::middlewares::{self, RequireJWT, RequireRole};
use crate::models::principals::entities::Role;
use crate::models::submissions::requests::ArtifactUpload;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::SubmissionEngine;
use crate::utils::validate::validate_extension;

// 表单中 assignment_id 字段的最大长度
const MAX_ID_FIELD_LEN: usize = 32;

/// 解析后的提交表单
struct SubmissionForm {
    assignment_id: i64,
    artifact: ArtifactUpload,
}

fn bad_request(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

/// 读取 multipart 表单：一个 `assignment_id` 文本字段与恰好一个 `file` 文件字段
///
/// 失败时直接返回 400 响应。
async fn read_form(
    mut payload: Multipart,
    upload: &UploadConfig,
) -> Result<SubmissionForm, HttpResponse> {
    let mut assignment_id: Option<String> = None;
    let mut artifact: Option<ArtifactUpload> = None;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                debug!("Malformed multipart payload: {}", e);
                return Err(bad_request(ErrorCode::BadRequest, "Malformed multipart payload"));
            }
        };

        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "assignment_id" => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.try_next().await.map_err(|_| {
                    bad_request(ErrorCode::BadRequest, "Malformed multipart payload")
                })? {
                    raw.extend_from_slice(&chunk);
                    if raw.len() > MAX_ID_FIELD_LEN {
                        return Err(bad_request(ErrorCode::BadRequest, "assignment_id is invalid"));
                    }
                }
                assignment_id = Some(String::from_utf8_lossy(&raw).trim().to_string());
            }
            "file" => {
                if artifact.is_some() {
                    return Err(bad_request(
                        ErrorCode::MultifileUploadNotAllowed,
                        "Only one file can be uploaded at a time",
                    ));
                }

                let file_name = content_disposition
                    .and_then(|cd| cd.get_filename())
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                if let Err(msg) = validate_extension(&file_name, &upload.allowed_types) {
                    return Err(bad_request(ErrorCode::FileTypeNotAllowed, msg));
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = field.try_next().await.map_err(|_| {
                    bad_request(ErrorCode::BadRequest, "Malformed multipart payload")
                })? {
                    // 校验大小
                    if bytes.len() + chunk.len() > upload.max_size {
                        return Err(bad_request(
                            ErrorCode::FileSizeExceeded,
                            "File size exceeds the limit",
                        ));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                if bytes.is_empty() {
                    return Err(bad_request(ErrorCode::BadRequest, "Uploaded file is empty"));
                }

                artifact = Some(ArtifactUpload { file_name, bytes });
            }
            // 其他字段忽略
            _ => {}
        }
    }

    let assignment_id = match assignment_id {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| bad_request(ErrorCode::BadRequest, "assignment_id is invalid"))?,
        None => {
            return Err(bad_request(ErrorCode::BadRequest, "assignment_id is required"));
        }
    };
    let artifact =
        artifact.ok_or_else(|| bad_request(ErrorCode::BadRequest, "file is required"))?;

    Ok(SubmissionForm {
        assignment_id,
        artifact,
    })
}

// 学生提交作业
pub async fn create_submission(
    req: HttpRequest,
    engine: web::Data<SubmissionEngine>,
    upload: web::Data<UploadConfig>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let claims = RequireJWT::extract_claims(&req)?;

    let form = match read_form(payload, &upload).await {
        Ok(form) => form,
        Err(response) => return Ok(response),
    };

    let submission = engine
        .submit(form.assignment_id, claims.subject_id, form.artifact)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        submission,
        "Submission created successfully",
    )))
}

// 配置路由
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(RequireRole::new_any(&[Role::Student]))
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(create_submission)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{
        App,
        http::{StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
        test,
    };
    use chrono::{Duration, Utc};

    use crate::routes::testing::{TestBackend, multipart_body};

    const BOUNDARY: &str = "----elearning-test-boundary";

    fn submit_request(token: &str, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/v1/submissions")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_submit_then_duplicate_is_conflict() {
        let backend = TestBackend::new().await;
        let assignment = backend
            .school
            .assignment("Essay", Utc::now() + Duration::days(1))
            .await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;
        let token = backend.student_token();
        let id = assignment.id.to_string();

        let body = multipart_body(BOUNDARY, Some(&id), &[("essay.pdf", "%PDF-1.4".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["status"], "on_time");
        let artifact_ref = json["data"]["artifact_ref"].as_str().unwrap();
        assert!(artifact_ref.starts_with("http://school.test/static/assignment_submissions/"));
        assert!(artifact_ref.ends_with(".pdf"));

        let body = multipart_body(BOUNDARY, Some(&id), &[("again.pdf", "%PDF-1.4".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_missing_fields_are_bad_request() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;
        let token = backend.student_token();

        let no_file = multipart_body(BOUNDARY, Some("1"), &[]);
        let resp = test::call_service(&app, submit_request(&token, no_file).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let no_id = multipart_body(BOUNDARY, None, &[("essay.pdf", "x".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, no_id).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bad_id = multipart_body(BOUNDARY, Some("abc"), &[("essay.pdf", "x".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, bad_id).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_upload_limits() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;
        let token = backend.student_token();

        let wrong_type = multipart_body(BOUNDARY, Some("1"), &[("virus.exe", "MZ".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, wrong_type).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["code"], 3003);

        let big = vec![b'a'; 65];
        let too_big = multipart_body(BOUNDARY, Some("1"), &[("big.txt", big.as_slice())]);
        let resp = test::call_service(&app, submit_request(&token, too_big).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["code"], 3004);

        let two = multipart_body(BOUNDARY, Some("1"), &[("a.txt", "a".as_bytes()), ("b.txt", "b".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, two).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["code"], 3005);
    }

    #[actix_web::test]
    async fn test_not_found_and_not_enrolled() {
        let backend = TestBackend::new().await;
        let assignment = backend
            .school
            .assignment("Essay", Utc::now() + Duration::days(1))
            .await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let token = backend.student_token();
        let body = multipart_body(BOUNDARY, Some("9999"), &[("essay.pdf", "x".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let outsider = &backend.school.unassigned;
        let token = backend.token(
            outsider.id,
            &outsider.email,
            crate::models::principals::entities::Role::Student,
        );
        let id = assignment.id.to_string();
        let body = multipart_body(BOUNDARY, Some(&id), &[("essay.pdf", "x".as_bytes())]);
        let resp = test::call_service(&app, submit_request(&token, body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["code"], 3001);
    }

    #[actix_web::test]
    async fn test_teacher_cannot_submit() {
        let backend = TestBackend::new().await;
        let app =
            test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let body = multipart_body(BOUNDARY, Some("1"), &[("essay.pdf", "x".as_bytes())]);
        let resp =
            test::call_service(&app, submit_request(&backend.teacher_token(), body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
