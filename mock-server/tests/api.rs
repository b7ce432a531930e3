use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, SessionUser};
use serde_json::Value;
use tower::ServiceExt;

const APIKEY: &str = "anon";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("apikey", APIKEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("apikey", APIKEY)
        .body(body.to_string())
        .unwrap()
}

// --- select ---

#[tokio::test]
async fn select_from_empty_table() {
    let resp = app().oneshot(get("/rest/v1/profiles?select=*")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Value> = body_json(resp).await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn select_without_apikey_is_unauthorized() {
    let resp = app()
        .oneshot(Request::builder().uri("/rest/v1/profiles").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsupported_operator_is_rejected() {
    let resp = app().oneshot(get("/rest/v1/profiles?age=gt.3")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- insert ---

#[tokio::test]
async fn insert_assigns_id_and_echoes_row() {
    let resp = app()
        .oneshot(json_request("POST", "/rest/v1/profiles", r#"{"email":"a@b.com"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "a@b.com");
    assert!(rows[0]["id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
}

#[tokio::test]
async fn insert_rejects_scalars() {
    let resp = app()
        .oneshot(json_request("POST", "/rest/v1/profiles", "42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- auth ---

#[tokio::test]
async fn session_user_without_token_is_unauthorized() {
    let resp = app().oneshot(get("/auth/v1/user")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- full lifecycle ---

#[tokio::test]
async fn filter_order_limit_and_session() {
    use tower::Service;

    let mut app = app().into_service();

    // seed two owners' resumes
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/rest/v1/resumes",
            r#"[
                {"user_id":"u1","status":"uploaded","created_at":"2024-01-01T00:00:00Z"},
                {"user_id":"u1","status":"processed","created_at":"2024-03-01T00:00:00Z"},
                {"user_id":"u2","status":"processed","created_at":"2024-02-01T00:00:00Z"}
            ]"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // filter by owner, newest first
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/rest/v1/resumes?select=*&user_id=eq.u1&order=created_at.desc"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Value> = body_json(resp).await;
    let statuses: Vec<_> = rows.iter().map(|r| r["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, vec!["processed", "uploaded"]);

    // limit
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/rest/v1/resumes?user_id=eq.u1&order=created_at.desc&limit=1"))
        .await
        .unwrap();
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["created_at"], "2024-03-01T00:00:00Z");

    // register a session
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/auth/v1/sessions",
            r#"{"token":"jwt-1","user":{"id":"00000000-0000-0000-0000-000000000001","email":"a@b.com"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(body_bytes(resp).await.is_empty());

    // resolve it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/auth/v1/user")
                .header("apikey", APIKEY)
                .header(http::header::AUTHORIZATION, "Bearer jwt-1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user: SessionUser = body_json(resp).await;
    assert_eq!(user.email.as_deref(), Some("a@b.com"));

    // unknown token
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/auth/v1/user")
                .header("apikey", APIKEY)
                .header(http::header::AUTHORIZATION, "Bearer nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
