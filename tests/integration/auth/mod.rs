//! Bearer-token enforcement on the products API

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt;

use crate::common::{authed_request, create_test_jwt, parse_body, TestApp};

#[tokio::test]
async fn test_missing_authorization_is_401() {
    let app = TestApp::without_database();
    let req = Request::builder()
        .uri("/v1/products")
        .body(Body::empty())
        .unwrap();

    let resp = app.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = parse_body(resp).await;
    assert!(body["error"]["code"].is_string());
}

#[tokio::test]
async fn test_non_bearer_scheme_is_401() {
    let app = TestApp::without_database();
    let req = Request::builder()
        .uri("/v1/products")
        .header("authorization", "Basic YWRtaW46cGFzcw==")
        .body(Body::empty())
        .unwrap();

    let resp = app.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_401() {
    let app = TestApp::without_database();
    let jwt = create_test_jwt("admin-1", "some-other-secret").unwrap();

    let resp = app
        .router()
        .oneshot(authed_request(Method::GET, "/v1/products", &jwt, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_publish_requires_auth() {
    let app = TestApp::without_database();
    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/v1/products/{}/publish", uuid::Uuid::new_v4()))
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let resp = app.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(app.instagram.recorded_calls().is_empty());
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = TestApp::without_database();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let resp = app.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
