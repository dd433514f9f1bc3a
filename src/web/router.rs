//! Route definitions for web server.

use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::store::Store;

use super::api;

/// Create the API router.
pub fn create_api_router() -> Router<Arc<Store>> {
    Router::new()
        .route(
            "/applications",
            get(api::list_applications).post(api::create_application),
        )
        .route(
            "/applications/:id",
            put(api::update_application).delete(api::delete_application),
        )
        .route("/download-csv", get(api::download_csv))
}

/// Create the full app router.
pub fn create_app_router(store: Arc<Store>) -> Router {
    Router::new()
        .nest("/api", create_api_router())
        .route("/health", get(health_check))
        .with_state(store)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<Store>, TempDir) {
        crate::logging::init_test();
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(temp_dir.path().join("applications.csv")));
        store.init().unwrap();
        (create_app_router(store.clone()), store, temp_dir)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn application(id: &str) -> Value {
        json!({
            "id": id,
            "jobTitle": "Eng",
            "companyName": "Acme",
            "pointsEarned": 10,
            "isTailored": false,
            "hasReferral": false,
            "timestamp": "2024-03-01T10:00:00.000Z",
            "status": "Applied"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _store, _temp) = test_app();
        let response = app.oneshot(empty_request(Method::GET, "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (app, _store, _temp) = test_app();

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/applications", application("1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Application saved successfully.");
        assert_eq!(body["application"]["companyName"], "Acme");

        let response = app
            .oneshot(empty_request(Method::GET, "/api/applications"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalScore"], 10);
        assert_eq!(body["applications"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_missing_field_is_400() {
        let (app, store, _temp) = test_app();
        let mut payload = application("1");
        payload.as_object_mut().unwrap().remove("jobTitle");

        let response = app
            .oneshot(json_request(Method::POST, "/api/applications", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
        assert!(store.read_all().unwrap().applications.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _store, _temp) = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/applications")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_merges_partial_body() {
        let (app, store, _temp) = test_app();
        app.clone()
            .oneshot(json_request(Method::POST, "/api/applications", application("1")))
            .await
            .unwrap();

        let response = app
            .oneshot(json_request(
                Method::PUT,
                "/api/applications/1",
                json!({"id": "1", "status": "Offer"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["application"]["status"], "Offer");
        assert_eq!(body["application"]["jobTitle"], "Eng");

        let stored = &store.read_all().unwrap().applications[0];
        assert_eq!(stored.status, "Offer");
        assert_eq!(stored.points_earned, 10);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let (app, _store, _temp) = test_app();
        app.clone()
            .oneshot(json_request(Method::POST, "/api/applications", application("1")))
            .await
            .unwrap();

        let mismatch = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                "/api/applications/1",
                json!({"id": "2", "status": "Offer"}),
            ))
            .await
            .unwrap();
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

        let missing = app
            .oneshot(json_request(
                Method::PUT,
                "/api/applications/9",
                json!({"id": "9", "status": "Offer"}),
            ))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let (app, store, _temp) = test_app();
        app.clone()
            .oneshot(json_request(Method::POST, "/api/applications", application("1")))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/api/applications/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Application deleted successfully."
        );
        assert!(store.read_all().unwrap().applications.is_empty());

        let again = app
            .oneshot(empty_request(Method::DELETE, "/api/applications/1"))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_csv() {
        let (app, store, _temp) = test_app();
        app.clone()
            .oneshot(json_request(Method::POST, "/api/applications", application("1")))
            .await
            .unwrap();

        let response = app
            .oneshot(empty_request(Method::GET, "/api/download-csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("job_applications.csv"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.to_vec(), store.export().unwrap());
    }

    #[tokio::test]
    async fn test_download_missing_file_is_404() {
        crate::logging::init_test();
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(temp_dir.path().join("absent.csv")));
        let app = create_app_router(store);

        let response = app
            .oneshot(empty_request(Method::GET, "/api/download-csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
