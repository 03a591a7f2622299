//! Integration tests for the auth-service proxy routes.

use atrium_server::{Server, ServerConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;
use wiremock::matchers::{body_string, header as upstream_header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_with_upstream(upstream_url: &str) -> Server {
    let config = ServerConfig::default()
        .with_upstream_auth_url(upstream_url)
        .with_request_logging(false);
    Server::new(config).expect("server builds")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_token_proxy_relays_success_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(upstream_header(
            "content-type",
            "application/x-www-form-urlencoded",
        ))
        .and(body_string("username=testuser&password=password123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "upstream-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = server_with_upstream(&upstream.uri()).router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=testuser&password=password123"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["access_token"], "upstream-token");
}

#[tokio::test]
async fn test_proxy_relays_upstream_error_status_and_body() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "detail": "email already registered"
        })))
        .mount(&upstream)
        .await;

    let app = server_with_upstream(&upstream.uri()).router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "username": "testuser",
                        "email": "test@example.com",
                        "password": "password123"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "email already registered");
}

#[tokio::test]
async fn test_unreachable_upstream_yields_generic_500() {
    // Port 9 (discard) is not listening; the connect fails with no response.
    let app = server_with_upstream("http://127.0.0.1:9").router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=x&password=y"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication service is unavailable");
    assert!(body["details"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn test_logout_proxy_forwards_authorization_header() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(upstream_header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "ok"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = server_with_upstream(&upstream.uri()).router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(header::AUTHORIZATION, "Bearer abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_proxy_relays_401() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": "UNAUTHORIZED",
            "message": "Invalid refresh token"
        })))
        .mount(&upstream)
        .await;

    let app = server_with_upstream(&upstream.uri()).router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/refresh")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "refreshToken": "stale" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}
