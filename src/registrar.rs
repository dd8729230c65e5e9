//! # DID Registrar
//!
//! Adapts [`LedgerService`] to the DID Registration interface expected by
//! agent frameworks (<https://identity.foundation/did-registration/>): a
//! request carrying framework-shaped options and a `didState` result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::did::Did;
use crate::document::DidDocument;
use crate::error::Error;
use crate::service::{CreateOptions, CreatedDid, LedgerService, Outcome, UpdateFields};
use crate::transport::LedgerTransport;

/// A registrar supports the write operations of a DID method.
#[allow(async_fn_in_trait)]
pub trait DidRegistrar {
    /// Register a new DID.
    async fn create(&self, options: DidCreateOptions) -> DidOperationResult;

    /// Update the key and/or role of an existing DID.
    async fn update(&self, options: DidUpdateOptions) -> DidOperationResult;

    /// Deactivate a DID. A deactivated DID can no longer be resolved.
    async fn deactivate(&self, options: DidDeactivateOptions) -> DidOperationResult;

    /// DID methods handled by this registrar.
    fn supported_methods(&self) -> Vec<String>;
}

/// Input to [`DidRegistrar::create`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidCreateOptions {
    /// DID method. Used as the network when `options.network` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Requested DID. Must equal the DID derived from `options` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,

    /// Method options.
    #[serde(default)]
    pub options: CreateOptions,
}

/// Input to [`DidRegistrar::update`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidUpdateOptions {
    /// DID to update.
    pub did: String,

    /// Fields to change.
    #[serde(default)]
    pub options: UpdateFields,
}

/// Input to [`DidRegistrar::deactivate`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDeactivateOptions {
    /// DID to deactivate.
    pub did: String,
}

/// State of a registration operation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum State {
    /// The operation completed.
    #[default]
    Finished,
    /// The operation failed. See `reason`.
    Failed,
}

/// Key material returned to the caller on creation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Secret {
    /// The key bound to the new DID.
    pub verkey: String,
}

/// Current state of the DID targeted by an operation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidState {
    /// Operation state.
    pub state: State,

    /// The DID, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,

    /// Secrets generated or bound by the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<Secret>,

    /// The DID document, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<DidDocument>,

    /// Why the operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of a registrar operation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidOperationResult {
    /// State of the DID.
    pub did_state: DidState,

    /// Metadata about the DID document.
    pub did_document_metadata: Map<String, Value>,

    /// Metadata about the registration process.
    pub did_registration_metadata: Map<String, Value>,
}

impl DidOperationResult {
    /// A `finished` result.
    #[must_use]
    pub fn finished(did_state: DidState) -> Self {
        Self {
            did_state: DidState {
                state: State::Finished,
                ..did_state
            },
            ..Self::default()
        }
    }

    /// A `failed` result with `reason`.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            did_state: DidState {
                state: State::Failed,
                reason: Some(reason.into()),
                ..DidState::default()
            },
            ..Self::default()
        }
    }
}

impl From<Outcome<CreatedDid>> for DidOperationResult {
    fn from(outcome: Outcome<CreatedDid>) -> Self {
        match outcome {
            Outcome::Finished(created) => Self::finished(DidState {
                did: Some(created.did),
                secret: Some(Secret {
                    verkey: created.verkey,
                }),
                did_document: Some(created.document),
                ..DidState::default()
            }),
            Outcome::Failed(reason) => Self::failed(reason),
        }
    }
}

/// Optional operations a registrar offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Offer [`DidRegistrar::update`].
    pub update: bool,
    /// Offer [`DidRegistrar::deactivate`].
    pub deactivate: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            update: true,
            deactivate: true,
        }
    }
}

impl Capabilities {
    /// Offer `create` only.
    #[must_use]
    pub const fn create_only() -> Self {
        Self {
            update: false,
            deactivate: false,
        }
    }
}

/// [`DidRegistrar`] backed by a [`LedgerService`].
#[derive(Clone, Debug)]
pub struct LedgerDidRegistrar<T: LedgerTransport> {
    service: LedgerService<T>,
    capabilities: Capabilities,
}

impl<T: LedgerTransport> LedgerDidRegistrar<T> {
    /// Create a registrar offering every operation.
    pub fn new(service: LedgerService<T>) -> Self {
        Self::with_capabilities(service, Capabilities::default())
    }

    /// Create a registrar offering the given operations.
    pub const fn with_capabilities(service: LedgerService<T>, capabilities: Capabilities) -> Self {
        Self {
            service,
            capabilities,
        }
    }

    /// Operations offered.
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl<T: LedgerTransport> DidRegistrar for LedgerDidRegistrar<T> {
    async fn create(&self, options: DidCreateOptions) -> DidOperationResult {
        let DidCreateOptions {
            method,
            did,
            options: mut create,
        } = options;
        if create.network.is_none() {
            create.network = method;
        }
        if let Some(requested) = did {
            let network = match &create.network {
                Some(name) => Some(name.as_str()),
                None => self.service.registry().default_network().ok().map(|n| n.name.as_str()),
            };
            // unknown networks are reported by the service
            if let Some(network) = network {
                let derived = Did::new(network, &create.method_specific_id).to_string();
                if requested != derived {
                    let err = Error::Validation(format!(
                        "requested DID '{requested}' does not match '{derived}'"
                    ));
                    tracing::error!("{err}");
                    return DidOperationResult::failed(err.to_string());
                }
            }
        }
        self.service.create(create).await.into()
    }

    async fn update(&self, options: DidUpdateOptions) -> DidOperationResult {
        if !self.capabilities.update {
            return gated("Update");
        }
        match self.service.update(&options.did, options.options).await {
            Outcome::Finished(()) => Self::did_finished(options.did),
            Outcome::Failed(reason) => DidOperationResult::failed(reason),
        }
    }

    async fn deactivate(&self, options: DidDeactivateOptions) -> DidOperationResult {
        if !self.capabilities.deactivate {
            return gated("Deactivate");
        }
        match self.service.deactivate(&options.did).await {
            Outcome::Finished(()) => Self::did_finished(options.did),
            Outcome::Failed(reason) => DidOperationResult::failed(reason),
        }
    }

    fn supported_methods(&self) -> Vec<String> {
        self.service.registry().names().map(ToString::to_string).collect()
    }
}

impl<T: LedgerTransport> LedgerDidRegistrar<T> {
    fn did_finished(did: String) -> DidOperationResult {
        DidOperationResult::finished(DidState {
            did: Some(did),
            ..DidState::default()
        })
    }
}

fn gated(operation: &str) -> DidOperationResult {
    let err = Error::Unsupported(operation.to_string());
    tracing::warn!("{err}");
    DidOperationResult::failed(err.to_string())
}
