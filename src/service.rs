//! # Ledger Service
//!
//! Orchestrates the DID lifecycle against the configured networks: picks the
//! network, builds the ledger transaction, calls the transport and turns the
//! answer into a DID document.
//!
//! Every operation folds its failures into an outcome value. Nothing is
//! cached: each `resolve` goes back to the ledger.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::did::Did;
use crate::document::DidDocument;
use crate::error::Error;
use crate::network::{NetworkConfig, NetworkRegistry};
use crate::transaction::{
    self, LedgerTransaction, NymOperation, ReadResponse, TransactionKind, CREATE_PATH,
    DEFAULT_ROLE, UNCHANGED_VERKEY, UPDATE_PATH,
};
use crate::transport::{LedgerTransport, Method};
use crate::Result;

/// Result of a ledger write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The ledger accepted the operation.
    Finished(T),

    /// The operation failed. The reason is suitable for display.
    Failed(String),
}

impl<T> Outcome<T> {
    /// Returns `true` if the operation finished.
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Reason for failure, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Finished(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Finished(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Result of resolving a DID.
///
/// `NotFound` covers both a DID the ledger does not know and a ledger that
/// could not be reached. `Error` is reserved for failures detected locally:
/// an unparsable DID, an unknown network, or a ledger answer without a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The DID document.
    Found(DidDocument),

    /// The ledger did not return the DID.
    NotFound(String),

    /// The DID could not be resolved.
    Error(String),
}

/// Input for [`LedgerService::create`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    /// Identifier to register under the network.
    #[serde(default)]
    pub method_specific_id: String,

    /// Public key to bind to the DID.
    #[serde(default)]
    pub verkey: String,

    /// Target network. The default network is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Ledger role. Defaults to [`DEFAULT_ROLE`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl CreateOptions {
    /// Options for registering `method_specific_id` with `verkey` on the
    /// default network.
    #[must_use]
    pub fn new(method_specific_id: impl Into<String>, verkey: impl Into<String>) -> Self {
        Self {
            method_specific_id: method_specific_id.into(),
            verkey: verkey.into(),
            ..Self::default()
        }
    }

    /// Target a specific network.
    #[must_use]
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Request a ledger role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Fields changed by [`LedgerService::update`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFields {
    /// New public key. The ledger's `unchanged` sentinel is sent when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verkey: Option<String>,

    /// New role. Defaults to [`DEFAULT_ROLE`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A DID written to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedDid {
    /// The new DID.
    pub did: String,
    /// The key bound to it.
    pub verkey: String,
    /// Its DID document.
    pub document: DidDocument,
}

/// DID lifecycle operations over a [`LedgerTransport`].
#[derive(Clone, Debug)]
pub struct LedgerService<T: LedgerTransport> {
    registry: Arc<NetworkRegistry>,
    transport: T,
}

impl<T: LedgerTransport> LedgerService<T> {
    /// Create a service over the given networks and transport.
    pub const fn new(registry: Arc<NetworkRegistry>, transport: T) -> Self {
        Self { registry, transport }
    }

    /// Configured networks.
    #[must_use]
    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// Register a new DID on the ledger.
    ///
    /// The identifier is not checked for prior existence: a repeated create
    /// is forwarded and its outcome is whatever the ledger answers.
    pub async fn create(&self, options: CreateOptions) -> Outcome<CreatedDid> {
        let outcome = Outcome::from(self.try_create(options).await);
        if let Outcome::Failed(reason) = &outcome {
            tracing::error!("failed to create DID: {reason}");
        }
        outcome
    }

    async fn try_create(&self, options: CreateOptions) -> Result<CreatedDid> {
        let CreateOptions {
            method_specific_id,
            verkey,
            network,
            role,
        } = options;
        if method_specific_id.is_empty() || verkey.is_empty() {
            return Err(Error::Validation("Missing methodSpecificId or verkey".into()));
        }

        let network = self.network(network.as_deref())?;
        let did = Did::new(&network.name, &method_specific_id).to_string();
        if !Did::from_str(&did).is_ok_and(|d| d.network == network.name) {
            return Err(Error::InvalidDid(format!(
                "network name '{}' cannot appear in a DID",
                network.name
            )));
        }

        let operation = NymOperation {
            dest: method_specific_id,
            verkey: verkey.clone(),
            role: role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        };
        let tx = LedgerTransaction::nym(&network.name, &operation);
        tracing::debug!("creating {did} on '{}'", network.name);

        let res =
            self.transport.send(network, Method::Post, CREATE_PATH, Some(&tx.create_body())).await?;
        tracing::info!("created {did}");
        tracing::trace!("create response: {res}");

        let document = DidDocument::build(&did, &verkey);
        Ok(CreatedDid {
            did,
            verkey,
            document,
        })
    }

    /// Resolve a DID to its document by reading the nym from the ledger.
    pub async fn resolve(&self, did: &str) -> ResolveOutcome {
        let parsed = match Did::from_str(did) {
            Ok(d) => d,
            Err(e) => return ResolveOutcome::Error(e.to_string()),
        };
        let network = match self.registry.resolve(&parsed.network) {
            Ok(n) => n,
            Err(e) => return ResolveOutcome::Error(e.to_string()),
        };

        tracing::debug!("resolving {did}");
        let path = transaction::read_path(did, TransactionKind::Nym);
        let res = match self.transport.send(network, Method::Get, &path, None).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("failed to resolve DID '{did}': {e}");
                return ResolveOutcome::NotFound(format!("DID not found: {did}: {e}"));
            }
        };

        match serde_json::from_value::<ReadResponse>(res) {
            Ok(read) => ResolveOutcome::Found(DidDocument::build(did, &read.result.verkey)),
            Err(e) => {
                let err = Error::MalformedDocument(format!("no verkey in ledger response: {e}"));
                tracing::error!("failed to resolve DID '{did}': {err}");
                ResolveOutcome::Error(err.to_string())
            }
        }
    }

    /// Change the verkey and/or role of an existing DID.
    pub async fn update(&self, did: &str, fields: UpdateFields) -> Outcome<()> {
        let outcome = Outcome::from(self.try_update(did, fields).await);
        if let Outcome::Failed(reason) = &outcome {
            tracing::error!("failed to update DID '{did}': {reason}");
        }
        outcome
    }

    async fn try_update(&self, did: &str, fields: UpdateFields) -> Result<()> {
        let parsed = Did::from_str(did)?;
        let network = self.registry.resolve(&parsed.network)?;

        let operation = NymOperation {
            dest: parsed.suffix().to_string(),
            verkey: fields.verkey.unwrap_or_else(|| UNCHANGED_VERKEY.to_string()),
            role: fields.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        };
        let tx = LedgerTransaction::nym(&network.name, &operation);

        self.transport.send(network, Method::Post, UPDATE_PATH, Some(&tx.update_body(did))).await?;
        tracing::info!("updated {did}");
        Ok(())
    }

    /// Remove a DID from the ledger.
    pub async fn deactivate(&self, did: &str) -> Outcome<()> {
        let outcome = Outcome::from(self.try_deactivate(did).await);
        if let Outcome::Failed(reason) = &outcome {
            tracing::error!("failed to deactivate DID '{did}': {reason}");
        }
        outcome
    }

    async fn try_deactivate(&self, did: &str) -> Result<()> {
        let parsed = Did::from_str(did)?;
        let network = self.registry.resolve(&parsed.network)?;

        self.transport.send(network, Method::Delete, &transaction::delete_path(did), None).await?;
        tracing::info!("deactivated {did}");
        Ok(())
    }

    // Explicit network by name, otherwise the default network.
    pub(crate) fn network(&self, name: Option<&str>) -> Result<&NetworkConfig> {
        name.map_or_else(|| self.registry.default_network(), |n| self.registry.resolve(n))
    }

    // Submit a new transaction to `network`.
    pub(crate) async fn submit(&self, network: &NetworkConfig, tx: &LedgerTransaction) -> Result<Value> {
        self.transport.send(network, Method::Post, CREATE_PATH, Some(&tx.create_body())).await
    }
}
