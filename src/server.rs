//! Webhook HTTP server powered by axum.
//!
//! Serves:
//! - `POST /webhook/lawsense`: updates for the legal bot
//! - `POST /webhook/densa`:    updates for the medical bot
//! - `GET  /health`:           health check
//! - `GET  /`:                 status page

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{MatchedPath, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::platform::telegram::decode_update;
use crate::relay::AppContext;

// Embedded at compile time, no runtime file needed.
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Status page with the listening port filled in.
fn render_index(port: u16) -> String {
    INDEX_HTML.replace("{port}", &port.to_string())
}

/// Build the router: one webhook route per identity plus health and index.
pub fn build_router(ctx: Arc<AppContext>, port: u16) -> Router {
    let page = render_index(port);
    let mut router: Router<Arc<AppContext>> = Router::new()
        .route("/", get(move || async move { Html(page) }))
        .route("/health", get(health_check));

    for identity in ctx.registry.iter() {
        router = router.route(&identity.webhook_path, post(receive_update));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// POST /webhook/{bot}: inbound Telegram update.
///
/// The identity is whichever one owns the matched route. Delivery problems
/// are logged; the caller always gets 200 for a well-formed update.
async fn receive_update(
    State(ctx): State<Arc<AppContext>>,
    path: MatchedPath,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let Some(identity) = ctx.registry.by_path(path.as_str()).cloned() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "ok": false, "error": "unknown webhook" })),
        );
    };

    let update = match decode_update(&body) {
        Ok(Some(update)) => update,
        Ok(None) => return (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => {
            warn!("Rejected update for {}: {}", identity.name, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": "malformed update" })),
            );
        }
    };

    let delivery = ctx.handle_update(&identity, &update).await;
    debug!("{} update from chat {}: {:?}", identity.name, update.chat_id, delivery);

    (StatusCode::OK, Json(json!({ "ok": true })))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    bots: BTreeMap<String, &'static str>,
}

/// GET /health: every configured bot is reported active while the
/// process is up.
async fn health_check(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    let bots = ctx
        .registry
        .iter()
        .map(|identity| (identity.name.clone(), "active"))
        .collect();

    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        bots,
    })
}
