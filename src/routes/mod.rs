//! Router assembly.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::core::twiml::{GATHER_WEBHOOK_PATH, VOICE_WEBHOOK_PATH};
use crate::handlers::{api, voice};
use crate::state::AppState;

/// Create the application router: the two Twilio webhooks plus the public
/// health check. Webhook paths are shared with the TwiML scripts so the
/// redirect and gather targets always match the mounted routes.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route(VOICE_WEBHOOK_PATH, post(voice::call_start))
        .route(GATHER_WEBHOOK_PATH, post(voice::speech_result))
        .layer(TraceLayer::new_for_http())
}
