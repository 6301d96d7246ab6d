use crate::interface_adapters::handlers::{get_view, post_input, ws_handler};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the kiosk routes to their handlers.
    Router::new()
        .route("/kiosk/input", post(post_input))
        .route("/kiosk/view", get(get_view))
        .route("/kiosk/ws", get(ws_handler))
        .with_state(state)
}
