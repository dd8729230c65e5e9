//! # Test Ledger
//!
//! Ledger emulators for testing `ledger-vdr`.
//!
//! - [`MockLedger`] is a [`LedgerTransport`] answering from memory and
//!   recording every request it receives.
//! - [`LedgerServer`] serves the same ledger over HTTP for end-to-end tests
//!   of [`ledger_vdr::HttpTransport`].

mod ledger;
mod server;

use std::sync::{Arc, Mutex, PoisonError};

use ledger_vdr::{Error, LedgerTransport, Method, NetworkConfig};
use serde_json::Value;

pub use crate::ledger::{DuplicatePolicy, Ledger, Rejection};
pub use crate::server::{LedgerServer, ServerOptions};

/// A request received by [`MockLedger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    /// Target network.
    pub network: String,
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Request body.
    pub body: Option<Value>,
}

/// In-memory [`LedgerTransport`].
#[derive(Clone, Debug, Default)]
pub struct MockLedger {
    ledger: Arc<Ledger>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockLedger {
    /// A ledger rejecting duplicate nyms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger applying `policy` to duplicate nyms.
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            ledger: Arc::new(Ledger::new(policy)),
            calls: Arc::default(),
        }
    }

    /// A ledger answering every request with `status`.
    #[must_use]
    pub fn rejecting(status: u16) -> Self {
        Self {
            ledger: Arc::new(Ledger::rejecting(status)),
            calls: Arc::default(),
        }
    }

    /// Ledger state.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LedgerTransport for MockLedger {
    async fn send(
        &self, network: &NetworkConfig, method: Method, path: &str, body: Option<&Value>,
    ) -> ledger_vdr::Result<Value> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(Call {
            network: network.name.clone(),
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        self.ledger.handle(method, path, body).map_err(|r| Error::LedgerRejected {
            status: r.status,
            body: r.body,
        })
    }
}
