//! Screening API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Maximum upload size in bytes (10 MB).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the screening API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` (via `with_state`).
pub fn screening_api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/screenings",
            post(endpoints::screenings::upload).get(endpoints::screenings::list),
        )
        .with_state(ctx.clone())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::ReferenceCatalog;
    use crate::db::sqlite::open_memory_database;

    fn test_router() -> Router {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn, ReferenceCatalog::builtin());
        screening_api_router(ctx)
    }

    const BOUNDARY: &str = "hemascreen-test-boundary";

    /// Build a multipart upload body with a `user_id` field and a file part.
    fn multipart_body(user_id: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(user_id) = user_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(user_id: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/screenings")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(user_id, file)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let app = test_router();
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["catalog_entries"].as_u64().unwrap() >= 10);
    }

    #[tokio::test]
    async fn upload_screens_text_document() {
        let app = test_router();
        let req = upload_request(
            Some("user-1"),
            Some(("results.txt", b"Glucose: 250 mg/dL\nHemoglobin: 14 g/dL")),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["file_name"], "results.txt");
        assert_eq!(json["flagged_count"], 1);
        assert!(json["summary"].as_str().unwrap().starts_with("Urgent:"));
        assert!(json["record_id"].is_string());
        assert!(json.get("warning").is_none());

        let values = json["values"].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["test_key"], "glucose");
        assert_eq!(values[0]["status"], "critical_high");
        assert_eq!(values[1]["test_key"], "hemoglobin");
        assert_eq!(values[1]["status"], "normal");
    }

    #[tokio::test]
    async fn upload_then_list_newest_first() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn, ReferenceCatalog::builtin());

        for file_name in ["first.txt", "second.txt"] {
            let app = screening_api_router(ctx.clone());
            let req = upload_request(Some("user-1"), Some((file_name, b"Glucose: 85 mg/dL")));
            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let app = screening_api_router(ctx);
        let req = Request::builder()
            .uri("/api/screenings?user_id=user-1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["count"], 2);
        let screenings = json["screenings"].as_array().unwrap();
        assert_eq!(screenings[0]["file_name"], "second.txt");
        assert_eq!(screenings[1]["file_name"], "first.txt");
    }

    #[tokio::test]
    async fn upload_still_succeeds_when_storage_fails() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn, ReferenceCatalog::builtin());
        {
            // Break the store so the insert fails after a good parse.
            let conn = ctx.db.lock().unwrap();
            conn.execute_batch("DROP TABLE screening_values; DROP TABLE screenings;")
                .unwrap();
        }

        let app = screening_api_router(ctx);
        let response = app
            .oneshot(upload_request(
                Some("user-1"),
                Some(("results.txt", b"Glucose: 250 mg/dL")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert!(json["record_id"].is_null());
        assert!(json["warning"]
            .as_str()
            .unwrap()
            .contains("could not be saved"));
        assert_eq!(json["flagged_count"], 1);
        assert!(json["summary"].as_str().unwrap().starts_with("Urgent:"));
    }

    #[tokio::test]
    async fn upload_without_file_is_400() {
        let app = test_router();
        let response = app
            .oneshot(upload_request(Some("user-1"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn upload_without_user_id_is_400() {
        let app = test_router();
        let response = app
            .oneshot(upload_request(None, Some(("results.txt", b"Glucose: 85 mg/dL"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn image_upload_is_rejected_with_fixed_message() {
        let app = test_router();
        let response = app
            .oneshot(upload_request(
                Some("user-1"),
                Some(("scan.jpg", &[0xFF, 0xD8, 0xFF, 0xE0])),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(
            json["error"]["message"],
            crate::pipeline::extract::UNSUPPORTED_IMAGE_MESSAGE
        );
    }

    #[tokio::test]
    async fn document_without_values_is_400_with_preview() {
        let app = test_router();
        let response = app
            .oneshot(upload_request(
                Some("user-1"),
                Some(("letter.txt", b"Dear patient, see you Monday.")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "NO_VALUES_FOUND");
        assert!(json["error"]["preview"]
            .as_str()
            .unwrap()
            .contains("Dear patient"));
    }

    #[tokio::test]
    async fn list_without_user_id_is_400() {
        let app = test_router();
        let req = Request::builder()
            .uri("/api/screenings")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_for_unknown_user_is_empty() {
        let app = test_router();
        let req = Request::builder()
            .uri("/api/screenings?user_id=nobody")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["count"], 0);
    }

    #[tokio::test]
    async fn rate_limit_kicks_in_per_user() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn, ReferenceCatalog::builtin());
        {
            // Exhaust the per-minute budget for this user directly.
            let mut limiter = ctx.rate_limiter.lock().unwrap();
            for _ in 0..1000 {
                let _ = limiter.check("user:user-1");
            }
        }

        let app = screening_api_router(ctx);
        let req = Request::builder()
            .uri("/api/screenings?user_id=user-1")
            .header("X-User-Id", "user-1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("Retry-After"));
    }
}
