// src/api.rs
//! HTTP surface for the presentation layer. Every command answers with the updated
//! session snapshot; rejected commands are not errors, the snapshot simply doesn't move.

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::MoodConfig;
use crate::orchestrator::MoodSession;
use crate::session::{ImageHandle, SessionSnapshot};

#[derive(Clone, Debug)]
pub struct AppState {
    pub session: MoodSession,
}

impl AppState {
    pub fn new(cfg: &MoodConfig) -> Self {
        Self {
            session: MoodSession::new(cfg),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/state", get(state_handler))
        .route("/quick-replies", get(quick_replies))
        .route("/image", post(image_selected))
        .route("/cheer", post(cheer))
        .route("/cancel", post(cancel))
        .route("/reset", post(reset))
        .route("/draft", put(update_draft))
        .route("/message", post(message))
        .route("/quick-reply", post(quick_reply))
        .route("/joke", post(joke))
        .route("/disclosure/ack", post(acknowledge_disclosure))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct ImageReq {
    #[serde(default)]
    handle: Option<String>,
}

#[derive(Deserialize)]
struct TextReq {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuickReplyReq {
    Index { index: usize },
    Polarity { positive: bool },
}

#[derive(Serialize)]
struct QuickReplyView {
    index: usize,
    text: String,
    positive: bool,
}

#[derive(Serialize)]
struct JokeResp {
    joke: String,
    state: SessionSnapshot,
}

async fn state_handler(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

async fn quick_replies(State(state): State<AppState>) -> Json<Vec<QuickReplyView>> {
    let views = state
        .session
        .quick_replies()
        .into_iter()
        .enumerate()
        .map(|(index, q)| QuickReplyView {
            index,
            text: q.text,
            positive: q.positive,
        })
        .collect();
    Json(views)
}

async fn image_selected(
    State(state): State<AppState>,
    Json(body): Json<ImageReq>,
) -> Json<SessionSnapshot> {
    state
        .session
        .image_selected(body.handle.and_then(ImageHandle::new));
    Json(state.session.snapshot())
}

async fn cheer(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.session.cheer_accepted();
    Json(state.session.snapshot())
}

async fn cancel(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.session.cancel();
    Json(state.session.snapshot())
}

async fn reset(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.session.reset();
    Json(state.session.snapshot())
}

async fn update_draft(
    State(state): State<AppState>,
    Json(body): Json<TextReq>,
) -> Json<SessionSnapshot> {
    state.session.update_draft(&body.text);
    Json(state.session.snapshot())
}

async fn message(State(state): State<AppState>, Json(body): Json<TextReq>) -> Json<SessionSnapshot> {
    state.session.message_sent(&body.text);
    Json(state.session.snapshot())
}

async fn quick_reply(
    State(state): State<AppState>,
    Json(body): Json<QuickReplyReq>,
) -> Json<SessionSnapshot> {
    match body {
        QuickReplyReq::Index { index } => state.session.quick_reply_at(index),
        QuickReplyReq::Polarity { positive } => state.session.quick_reply(positive),
    };
    Json(state.session.snapshot())
}

async fn joke(State(state): State<AppState>) -> Json<JokeResp> {
    let joke = state.session.tell_joke();
    Json(JokeResp {
        joke,
        state: state.session.snapshot(),
    })
}

async fn acknowledge_disclosure(State(state): State<AppState>) -> Json<SessionSnapshot> {
    state.session.acknowledge_disclosure();
    Json(state.session.snapshot())
}
