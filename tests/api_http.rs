// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use mood_prank_analyzer::{api, MoodConfig};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    api::create_router(api::AppState::new(&MoodConfig::default()))
}

async fn call(app: &Router, method: &str, uri: &str, payload: Option<Json>) -> (StatusCode, Json) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match payload {
        Some(p) => builder
            .header("content-type", "application/json")
            .body(Body::from(p.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().trim(), "ok");
}

#[tokio::test]
async fn api_initial_state_contract() {
    let app = test_router();
    let (st, v) = call(&app, "GET", "/state", None).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(v["phase"], "upload");
    assert_eq!(v["mood_level"], 0);
    assert_eq!(v["mood_tier"], "angry");
    assert!(v["image"].is_null());
    assert!(v["result"].is_null());
    assert_eq!(v["fooled_revealed"], false);
    assert!(v.get("updated_at").is_some(), "missing 'updated_at'");
}

#[tokio::test]
async fn api_quick_reply_catalogue() {
    let app = test_router();
    let (st, v) = call(&app, "GET", "/quick-replies", None).await;
    assert_eq!(st, StatusCode::OK);
    let list = v.as_array().expect("array");
    assert_eq!(list.len(), 16);
    assert_eq!(list[0]["index"], 0);
    assert_eq!(list[0]["positive"], true);
    assert_eq!(list[1]["positive"], false);
}

#[tokio::test]
async fn api_message_before_upload_is_ignored() {
    let app = test_router();
    let (st, v) = call(&app, "POST", "/message", Some(json!({"text": "You are amazing"}))).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(v["phase"], "upload");
    assert_eq!(v["mood_level"], 0);
}

#[tokio::test]
async fn api_image_without_handle_is_noop() {
    let app = test_router();
    let (_, v) = call(&app, "POST", "/image", Some(json!({"handle": null}))).await;
    assert_eq!(v["phase"], "upload");
    let (_, v) = call(&app, "POST", "/image", Some(json!({}))).await;
    assert_eq!(v["phase"], "upload");
}

#[tokio::test]
async fn api_cheering_flow() {
    let app = test_router();

    let (_, v) = call(&app, "POST", "/image", Some(json!({"handle": "blob:selfie"}))).await;
    assert_eq!(v["phase"], "refused");
    assert_eq!(v["image"], "blob:selfie");
    assert_eq!(v["refusal_prompt_open"], true);

    let (_, v) = call(&app, "POST", "/cheer", None).await;
    assert_eq!(v["phase"], "cheering");
    assert_eq!(v["refusal_prompt_open"], false);

    let (_, v) = call(&app, "PUT", "/draft", Some(json!({"text": "You are amazing"}))).await;
    assert_eq!(v["draft"], "You are amazing");

    let (_, v) = call(&app, "POST", "/message", Some(json!({"text": "You are amazing"}))).await;
    assert_eq!(v["mood_level"], 15);
    assert_eq!(v["draft"], "");

    let (_, v) = call(&app, "POST", "/quick-reply", Some(json!({"index": 1}))).await;
    assert_eq!(v["mood_level"], 0);

    let (st, v) = call(&app, "POST", "/joke", None).await;
    assert_eq!(st, StatusCode::OK);
    assert!(!v["joke"].as_str().unwrap_or_default().is_empty());
    assert_eq!(v["state"]["mood_level"], 18);

    let (_, v) = call(&app, "POST", "/quick-reply", Some(json!({"positive": true}))).await;
    assert_eq!(v["mood_level"], 30);
    assert_eq!(v["mood_tier"], "sad");

    // unknown catalogue index does nothing
    let (_, v) = call(&app, "POST", "/quick-reply", Some(json!({"index": 99}))).await;
    assert_eq!(v["mood_level"], 30);

    let (_, v) = call(&app, "POST", "/reset", None).await;
    assert_eq!(v["phase"], "upload");
    assert_eq!(v["mood_level"], 0);
    assert!(v["image"].is_null());
}

#[tokio::test]
async fn api_cancel_from_refusal() {
    let app = test_router();
    call(&app, "POST", "/image", Some(json!({"handle": "blob:selfie"}))).await;
    let (_, v) = call(&app, "POST", "/cancel", None).await;
    assert_eq!(v["phase"], "upload");
    assert!(v["image"].is_null());
    assert_eq!(v["refusal_prompt_open"], false);
}

#[tokio::test]
async fn api_disclosure_ack_requires_disclosure() {
    let app = test_router();
    call(&app, "POST", "/image", Some(json!({"handle": "blob:selfie"}))).await;
    let (_, v) = call(&app, "POST", "/disclosure/ack", None).await;
    // nothing revealed yet, so nothing to acknowledge
    assert_eq!(v["phase"], "refused");
}
