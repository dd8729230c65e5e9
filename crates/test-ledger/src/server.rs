//! # Ledger Server
//!
//! The ledger's REST transaction API served over HTTP on an ephemeral local
//! port.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::ledger::{DuplicatePolicy, Ledger, Rejection};

/// Server behavior.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    /// `Authorization` header value required on every request.
    pub token: Option<String>,
    /// Delay before answering each request.
    pub delay: Option<Duration>,
    /// What to do with duplicate nyms.
    pub policy: DuplicatePolicy,
    /// Raw `200` body answered to every read in place of the stored nym.
    pub read_body: Option<String>,
}

/// A running ledger server. Stopped when dropped.
#[derive(Debug)]
pub struct LedgerServer {
    base_url: String,
    ledger: Arc<Ledger>,
    task: JoinHandle<()>,
}

#[derive(Debug)]
struct AppState {
    ledger: Arc<Ledger>,
    token: Option<String>,
    delay: Option<Duration>,
    read_body: Option<String>,
}

impl LedgerServer {
    /// Start a server on `127.0.0.1` with an OS-assigned port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(options: ServerOptions) -> io::Result<Self> {
        let ledger = Arc::new(Ledger::new(options.policy));
        let state = Arc::new(AppState {
            ledger: Arc::clone(&ledger),
            token: options.token,
            delay: options.delay,
            read_body: options.read_body,
        });

        let app = Router::new()
            .route("/CreateTransaction", post(create))
            .route("/UpdateTransaction", post(update))
            .route("/ReadTransaction/{id}/{kind}", get(read))
            .route("/DeleteTransaction/{id}", delete(remove))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("ledger server stopped: {e}");
            }
        });
        tracing::debug!("ledger server listening on {addr}");

        Ok(Self {
            base_url: format!("http://{addr}"),
            ledger,
            task,
        })
    }

    /// URL to configure as the network's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The server's ledger state.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl Drop for LedgerServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl AppState {
    async fn authorize(&self, headers: &HeaderMap) -> Result<(), Rejection> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let Some(token) = &self.token else {
            return Ok(());
        };
        let sent = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if sent == Some(token.as_str()) {
            Ok(())
        } else {
            Err(Rejection::new(401, "unauthorized"))
        }
    }
}

async fn create(
    State(state): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<Value>,
) -> Response {
    respond(state.authorize(&headers).await.and_then(|()| state.ledger.create(&body)))
}

async fn update(
    State(state): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<Value>,
) -> Response {
    respond(state.authorize(&headers).await.and_then(|()| state.ledger.update(&body)))
}

async fn read(
    State(state): State<Arc<AppState>>, headers: HeaderMap,
    Path((id, kind)): Path<(String, String)>,
) -> Response {
    if let Some(body) = &state.read_body {
        return match state.authorize(&headers).await {
            Ok(()) => (StatusCode::OK, body.clone()).into_response(),
            Err(rejection) => respond(Err(rejection)),
        };
    }
    respond(state.authorize(&headers).await.and_then(|()| state.ledger.read(&id, &kind)))
}

async fn remove(
    State(state): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<String>,
) -> Response {
    respond(state.authorize(&headers).await.and_then(|()| state.ledger.delete(&id)))
}

fn respond(result: Result<Value, Rejection>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(rejection) => {
            let status =
                StatusCode::from_u16(rejection.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, rejection.body).into_response()
        }
    }
}
