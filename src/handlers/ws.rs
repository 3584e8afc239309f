//! Push channel for order events.
//!
//! Clients open an authenticated websocket at `/ws/orders` and receive every
//! `order_created` / `order_updated` event as a JSON text frame. The channel
//! is one-way: inbound frames other than ping/close are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::auth::{bearer_token, AuthError, AuthUser};
use crate::events::Event;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    /// Fallback for clients that cannot set headers on the websocket
    /// handshake (browsers).
    pub token: Option<String>,
}

/// Upgrade to the order event stream.
///
/// Authentication happens at connect time, from the `Authorization` header or
/// a `token` query parameter; an invalid token rejects the handshake before
/// the upgrade.
pub async fn orders_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<WsAuthQuery>,
) -> Response {
    let token = match bearer_token(&headers).map(str::to_owned).or(query.token) {
        Some(token) => token,
        None => return AuthError::MissingToken.into_response(),
    };

    let user = match state.auth.authenticate(&token) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    let events = state.broadcaster.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events, user))
}

async fn handle_socket(
    mut socket: WebSocket,
    mut events: broadcast::Receiver<Event>,
    user: AuthUser,
) {
    info!(waiter_id = user.waiter_id, "Order stream subscriber connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!(error = %e, "Failed to serialize order event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Slow consumer; it keeps the connection but loses events.
                    warn!(waiter_id = user.waiter_id, skipped, "Order stream subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(other)) => {
                    debug!(waiter_id = user.waiter_id, ?other, "Ignoring inbound frame");
                }
                Some(Err(_)) => break,
            },
        }
    }

    info!(waiter_id = user.waiter_id, "Order stream subscriber disconnected");
}
