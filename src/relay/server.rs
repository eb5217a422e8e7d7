// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! WebSocket endpoint at `/ws`. Each connection gets its own [`RelaySession`]; backend work
//! runs on the blocking pool.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use super::protocol::ServerMessage;
use super::session::RelaySession;
use crate::backend::Backend;

pub struct RelayState {
    backend: Arc<dyn Backend>,
    /// `None` accepts every origin.
    allow_origins: Option<HashSet<String>>,
}

impl RelayState {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            allow_origins: None,
        }
    }

    /// Restricts upgrades to the given `Origin` values. An empty list keeps every origin
    /// allowed.
    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origins: HashSet<String> = origins.into_iter().map(Into::into).collect();
        self.allow_origins = (!origins.is_empty()).then_some(origins);
        self
    }

    fn origin_allowed(&self, headers: &HeaderMap) -> bool {
        let Some(allow) = &self.allow_origins else {
            return true;
        };
        headers
            .get("origin")
            .and_then(|origin| origin.to_str().ok())
            .is_some_and(|origin| allow.contains(origin))
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(Arc::new(state))
}

/// Serves until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: RelayState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "relay listening");
    }
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

async fn ws_handler(
    State(state): State<Arc<RelayState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !state.origin_allowed(&headers) {
        let origin = headers
            .get("origin")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<missing>");
        warn!(?addr, origin = %origin, "origin rejected");
        return StatusCode::FORBIDDEN.into_response();
    }
    let session = RelaySession::new(state.backend.clone());
    ws.on_upgrade(move |socket| handle_socket(socket, session, addr))
}

async fn handle_socket(socket: WebSocket, session: RelaySession, peer: SocketAddr) {
    info!(?peer, "connection opened");
    let (mut ws_tx, mut ws_rx) = socket.split();

    let greeter = session.clone();
    match tokio::task::spawn_blocking(move || greeter.greeting()).await {
        Ok(messages) => {
            if send_all(&mut ws_tx, messages, peer).await.is_err() {
                return;
            }
        }
        Err(err) => {
            error!(?peer, ?err, "greeting task failed");
            return;
        }
    }

    while let Some(frame) = ws_rx.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                warn!(?peer, "ignoring binary frame");
                continue;
            }
            Ok(_) => continue,
            Err(err) => {
                warn!(?err, ?peer, "ws recv error");
                break;
            }
        };
        let worker = session.clone();
        let replies = match tokio::task::spawn_blocking(move || worker.handle(&text)).await {
            Ok(replies) => replies,
            Err(err) => {
                error!(?peer, ?err, "request task failed");
                break;
            }
        };
        if send_all(&mut ws_tx, replies, peer).await.is_err() {
            break;
        }
    }
    info!(?peer, "connection ended");
}

async fn send_all(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    messages: Vec<ServerMessage>,
    peer: SocketAddr,
) -> Result<(), axum::Error> {
    for message in messages {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(err) => {
                error!(?peer, ?err, "failed to encode reply");
                continue;
            }
        };
        debug!(?peer, bytes = text.len(), "sending reply");
        if let Err(err) = ws_tx.send(Message::Text(text.into())).await {
            warn!(?err, ?peer, "ws send error");
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{HeaderMap, HeaderValue};

    use super::RelayState;
    use crate::backend::FolderBackend;
    use crate::store::FileStore;

    fn state() -> RelayState {
        RelayState::new(Arc::new(FolderBackend::new(FileStore::new("unused"))))
    }

    fn origin(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("origin", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_any_origin_by_default() {
        let state = state();
        assert!(state.origin_allowed(&HeaderMap::new()));
        assert!(state.origin_allowed(&origin("http://elsewhere")));

        let state = state.with_allowed_origins(Vec::<String>::new());
        assert!(state.origin_allowed(&origin("http://elsewhere")));
    }

    #[test]
    fn restricts_to_listed_origins() {
        let state = state().with_allowed_origins(["http://localhost:3000"]);
        assert!(state.origin_allowed(&origin("http://localhost:3000")));
        assert!(!state.origin_allowed(&origin("http://localhost:3001")));
        assert!(!state.origin_allowed(&HeaderMap::new()));
    }
}
