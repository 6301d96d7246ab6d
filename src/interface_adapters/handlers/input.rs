use crate::interface_adapters::handlers::local_clock;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ClientMessage, KioskView};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::view::render_view;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[tracing::instrument(name = "kiosk_input", skip_all)]
pub async fn post_input(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ClientMessage>,
) -> Response {
    // Resolve against the current snapshot; the borrow must end before awaiting.
    let input = {
        let snapshot = state.state_rx.borrow();
        message.into_input(&snapshot)
    };
    let input = match input {
        Ok(input) => input,
        Err(err) => {
            tracing::debug!(error = %err, "input rejected");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(err.to_string())),
            )
                .into_response();
        }
    };

    if state.input_tx.send(input).await.is_err() {
        tracing::error!("kiosk task is gone; input dropped");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("kiosk unavailable")),
        )
            .into_response();
    }

    StatusCode::ACCEPTED.into_response()
}

#[tracing::instrument(name = "kiosk_view", skip_all)]
pub async fn get_view(State(state): State<Arc<AppState>>) -> Json<KioskView> {
    let view = render_view(&state.state_rx.borrow(), local_clock());
    Json(view)
}
