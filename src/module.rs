//! # Ledger Module
//!
//! Wires the crate's components together for a host agent: one registry,
//! one transport, and the service and facades sharing them.

use std::sync::Arc;

use crate::network::{LedgerConfig, NetworkRegistry};
use crate::registrar::{Capabilities, LedgerDidRegistrar};
use crate::resolver::LedgerDidResolver;
use crate::service::LedgerService;
use crate::transport::{HttpTransport, LedgerTransport};
use crate::Result;

/// Registered components for a set of ledger networks.
#[derive(Clone, Debug)]
pub struct LedgerModule<T: LedgerTransport> {
    service: LedgerService<T>,
    capabilities: Capabilities,
}

impl LedgerModule<HttpTransport> {
    /// Build the module with an HTTP transport honoring the configured
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the HTTP client cannot be
    /// initialized.
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let transport = match config.timeout() {
            Some(timeout) => HttpTransport::with_timeout(timeout)?,
            None => HttpTransport::new()?,
        };
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: LedgerTransport> LedgerModule<T> {
    /// Build the module over a custom transport.
    pub fn with_transport(config: &LedgerConfig, transport: T) -> Self {
        tracing::warn!(
            "the ledger VDR module is experimental and may have breaking changes between releases"
        );
        let registry = Arc::new(NetworkRegistry::from(config));
        tracing::debug!("ledger networks: {:?}", registry.names().collect::<Vec<_>>());

        Self {
            service: LedgerService::new(registry, transport),
            capabilities: Capabilities::default(),
        }
    }

    /// Restrict the operations offered by [`Self::registrar`].
    #[must_use]
    pub const fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The lifecycle service.
    pub const fn service(&self) -> &LedgerService<T> {
        &self.service
    }

    /// A registrar over the module's service.
    pub fn registrar(&self) -> LedgerDidRegistrar<T> {
        LedgerDidRegistrar::with_capabilities(self.service.clone(), self.capabilities)
    }

    /// A resolver over the module's service.
    pub fn resolver(&self) -> LedgerDidResolver<T> {
        LedgerDidResolver::new(self.service.clone())
    }
}
