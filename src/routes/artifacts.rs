use actix_web::{HttpResponse, Result as ActixResult, http::header, web};

use crate::errors::ElearningError;
use crate::storage::ArtifactStore;

// 按扩展名推断内容类型，未知类型按二进制流返回
fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

// 只读访问已保存的作业文件
pub async fn serve_artifact(
    artifacts: web::Data<dyn ArtifactStore>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (category, file_name) = path.into_inner();
    let relative = format!("{category}/{file_name}");

    let bytes = artifacts
        .read(&relative)
        .await?
        .ok_or_else(|| ElearningError::not_found(format!("Artifact {relative}")))?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(&file_name)))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{file_name}\""),
        ))
        .body(bytes))
}

// 配置路由
pub fn configure_artifact_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/static").route("/{category}/{filename}", web::get().to(serve_artifact)),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test as actix_test};

    use super::*;
    use crate::routes::testing::TestBackend;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.PDF"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[actix_web::test]
    async fn test_serves_saved_artifact() {
        let backend = TestBackend::new().await;
        let relative = backend
            .context
            .artifacts
            .save("assignment_submissions", "essay.txt", b"hello")
            .await
            .unwrap();
        let app =
            actix_test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let req = actix_test::TestRequest::get()
            .uri(&format!("/static/{relative}"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_test::read_body(resp).await;
        assert_eq!(&body[..], b"hello");

        let req = actix_test::TestRequest::get()
            .uri("/static/assignment_submissions/missing.txt")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_traversal_is_rejected() {
        let backend = TestBackend::new().await;
        let app =
            actix_test::init_service(App::new().configure(|cfg| backend.configure(cfg))).await;

        let req = actix_test::TestRequest::get()
            .uri("/static/../secret.txt")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
