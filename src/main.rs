//! Mood Analyzer Service: binary entrypoint.
//! Boots the Axum HTTP server with one shared mood session and a `/metrics` route.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mood_prank_analyzer::{api, metrics::Metrics, MoodConfig};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - MOOD_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("MOOD_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("session=info,phase=info,mood=info,warn"));

    // Shuttle may already have installed a subscriber; keep theirs in that case.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = MoodConfig::from_env()?;
    tracing::info!(
        time_unit_ms = cfg.timing.time_unit_ms,
        jokes = cfg.content.jokes.len(),
        quick_replies = cfg.content.quick_replies.len(),
        "mood config loaded"
    );

    let metrics = Metrics::init()?;
    let router = api::create_router(api::AppState::new(&cfg)).merge(metrics.router());

    Ok(router.into())
}
