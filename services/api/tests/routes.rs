//! Router tests that need neither a database nor Redis: they stop at
//! authentication or input validation.

mod support;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use support::{body_json, detached_user, jwt_service, offline_state};
use vidtube_api::routes::create_router;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let app = create_router(offline_state());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["data"]["database"], false);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    for uri in [
        "/api/v1/videos",
        "/api/v1/users/current-user",
        "/api/v1/likes/videos",
        "/api/v1/dashboard/stats",
        "/api/v1/users/history",
    ] {
        let app = create_router(offline_state());
        let response = app.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["message"], "Unauthorized request");
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"], serde_json::json!([]));
    }
}

#[tokio::test]
async fn test_garbage_bearer_token_is_rejected() {
    let app = create_router(offline_state());

    let request = Request::builder()
        .uri("/api/v1/videos")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid access token");
}

#[tokio::test]
async fn test_refresh_token_cannot_be_used_as_access_token() {
    let app = create_router(offline_state());
    let refresh = jwt_service().generate_refresh_token(&detached_user()).unwrap();

    let request = Request::builder()
        .uri("/api/v1/tweets/user/00000000-0000-0000-0000-000000000000")
        .header(header::COOKIE, format!("accessToken={}", refresh))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_identifier_and_password() {
    let app = create_router(offline_state());
    let response = app
        .oneshot(post_json("/api/v1/users/login", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "username or email is required"
    );

    let app = create_router(offline_state());
    let response = app
        .oneshot(post_json("/api/v1/users/login", r#"{"username":"alice"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "password is required");
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = create_router(offline_state());
    let response = app
        .oneshot(post_json("/api/v1/users/login", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_register_requires_multipart() {
    let app = create_router(offline_state());
    let response = app
        .oneshot(post_json("/api/v1/users/register", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_register_validates_fields_before_touching_storage() {
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"fullName\"\r\n\r\nAlice\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"email\"\r\n\r\nalice@example.com\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"username\"\r\n\r\nal\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"password\"\r\n\r\nsecret123\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/register")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = create_router(offline_state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Username must be at least 3 characters long"
    );
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() {
    let app = create_router(offline_state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/refresh-token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forged_refresh_token_is_rejected() {
    let app = create_router(offline_state());
    // signed with the access secret, so the refresh key cannot verify it
    let forged = jwt_service().generate_access_token(&detached_user()).unwrap();

    let response = app
        .oneshot(post_json(
            "/api/v1/users/refresh-token",
            &format!(r#"{{"refreshToken":"{}"}}"#, forged),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid refresh token");
}
