use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::debug;

use crate::analysis::models::{AnalysisResult, MediaType, RawDocument};
use crate::errors::AppError;
use crate::state::AppState;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// POST /api/v1/analyze
/// Multipart upload with a `file` part and an optional `media_type` text part.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut upload = None;
    let mut media_type_override = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("media_type") => media_type_override = Some(field.text().await?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file part".to_string()))?;
    if upload.file_name.is_empty() && upload.bytes.is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }

    let media_type = declared_media_type(
        media_type_override.as_deref(),
        upload.content_type.as_deref(),
        &upload.file_name,
    );
    debug!(
        file_name = %upload.file_name,
        %media_type,
        bytes = upload.bytes.len(),
        "received upload"
    );

    let result = state
        .pipeline
        .run(RawDocument::new(media_type, upload.bytes))
        .await?;
    Ok(Json(result))
}

/// Explicit override, then a recognised part content type, then the file
/// extension. Unrecognised values pass through so the extractor rejects them.
fn declared_media_type(
    override_type: Option<&str>,
    content_type: Option<&str>,
    file_name: &str,
) -> String {
    if let Some(declared) = override_type.filter(|t| !t.trim().is_empty()) {
        return declared.trim().to_string();
    }
    if let Some(known) = content_type.and_then(|ct| MediaType::parse(ct).ok()) {
        return known.as_str().to_string();
    }
    if let Some(known) = MediaType::from_file_name(file_name) {
        return known.as_str().to_string();
    }
    content_type
        .map(str::to_string)
        .or_else(|| file_name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::extractor::tests::FakeDecoder;
    use crate::analysis::extractor::DocumentExtractor;
    use crate::analysis::pipeline::AnalysisPipeline;
    use crate::analysis::skills::{SkillCatalog, SkillMatcher};
    use crate::config::Config;
    use crate::routes::build_router;

    const BOUNDARY: &str = "atscan-test-boundary";

    fn app(docx_text: &str) -> Router {
        let matcher = SkillMatcher::new(&SkillCatalog::default()).unwrap();
        let extractor = DocumentExtractor::new(
            Arc::new(FakeDecoder::failing()),
            Arc::new(FakeDecoder::raw(docx_text)),
        );
        build_router(AppState {
            config: Config::default(),
            pipeline: AnalysisPipeline::new(extractor, Arc::new(matcher)),
        })
    }

    fn file_part(file_name: &str, content_type: &str, body: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{body}\r\n"
        )
    }

    fn upload(parts: &[String]) -> Request<Body> {
        let mut body = parts.concat();
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_docx_upload() {
        let text = "JANE DOE\njane@example.com\n(415) 555-2671\nSKILLS\nRust, Go";
        let req = upload(&[file_part(
            "resume.docx",
            "application/octet-stream",
            "PK-bytes",
        )]);
        let (status, body) = send(app(text), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "JANE DOE");
        assert_eq!(body["email"], "jane@example.com");
        assert_eq!(body["phone"], "(415) 555-2671");
        assert_eq!(body["skills"], serde_json::json!(["Rust", "Go"]));
        assert_eq!(body["education"], "Not detected");
        assert!(body["score"].as_u64().unwrap() <= 100);
        assert!(!body["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_part_is_validation_error() {
        let part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n"
        );
        let (status, body) = send(app("unused"), upload(&[part])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "No file part");
    }

    #[tokio::test]
    async fn test_empty_file_selection_is_validation_error() {
        let req = upload(&[file_part("", "application/octet-stream", "")]);
        let (status, body) = send(app("unused"), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "No selected file");
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_415() {
        let req = upload(&[file_part("resume.txt", "text/plain", "plain text resume")]);
        let (status, body) = send(app("unused"), req).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_blank_document_is_422() {
        let req = upload(&[file_part("resume.docx", "application/octet-stream", "PK")]);
        let (status, body) = send(app("  \n\n "), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_FAILURE");
        assert_eq!(body["error"]["message"], "Could not extract text from file");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_422() {
        let req = upload(&[file_part("resume.pdf", "application/pdf", "%PDF-1.7")]);
        let (status, body) = send(app("unused"), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_FAILURE");
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app("unused"), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "atscan");
    }

    #[test]
    fn test_declared_media_type_precedence() {
        assert_eq!(declared_media_type(Some("docx"), Some("application/pdf"), "a.pdf"), "docx");
        assert_eq!(declared_media_type(None, Some("application/pdf"), "a.docx"), "pdf");
        assert_eq!(
            declared_media_type(None, Some("application/octet-stream"), "a.docx"),
            "docx"
        );
        assert_eq!(declared_media_type(Some("  "), None, "a.PDF"), "pdf");
        assert_eq!(declared_media_type(None, None, "a.txt"), "txt");
        assert_eq!(declared_media_type(None, None, "noext"), FALLBACK_MEDIA_TYPE);
    }
}
