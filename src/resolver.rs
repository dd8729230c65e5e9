//! # DID Resolver
//!
//! Adapts [`LedgerService::resolve`] to the DID Resolution result shape
//! (<https://w3c-ccg.github.io/did-resolution/>).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::DidDocument;
use crate::service::{LedgerService, ResolveOutcome};
use crate::transport::LedgerTransport;

/// JSON-LD context of a resolution result.
pub const RESOLUTION_CONTEXT: &str = "https://w3id.org/did-resolution/v1";

/// Content type of a resolved document.
pub const CONTENT_TYPE: &str = "application/did+ld+json";

/// Error code reported for any failed resolution.
pub const NOT_FOUND: &str = "notFound";

/// A resolver turns a DID into its DID document.
#[allow(async_fn_in_trait)]
pub trait DidResolver {
    /// Resolve a DID. Failures are reported in
    /// [`Resolution::did_resolution_metadata`].
    async fn resolve(&self, did: &str) -> Resolution;

    /// DID methods handled by this resolver.
    fn supported_methods(&self) -> Vec<String>;

    /// Whether results may be cached by the caller.
    fn allows_caching(&self) -> bool;
}

/// Metadata associated with a DID resolution response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// The content type of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// An error code if the resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human-readable detail for `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Return type from a DID document resolution.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Resolution context.
    #[serde(rename = "@context")]
    pub context: String,

    /// The DID document, if resolved.
    pub did_document: Option<DidDocument>,

    /// Metadata associated with the document.
    pub did_document_metadata: Map<String, Value>,

    /// Metadata associated with the response to the resolution request.
    pub did_resolution_metadata: ResolutionMetadata,
}

impl From<ResolveOutcome> for Resolution {
    fn from(outcome: ResolveOutcome) -> Self {
        let (did_document, did_resolution_metadata) = match outcome {
            ResolveOutcome::Found(doc) => (
                Some(doc),
                ResolutionMetadata {
                    content_type: Some(CONTENT_TYPE.to_string()),
                    ..ResolutionMetadata::default()
                },
            ),
            ResolveOutcome::NotFound(message) | ResolveOutcome::Error(message) => (
                None,
                ResolutionMetadata {
                    error: Some(NOT_FOUND.to_string()),
                    message: Some(message),
                    ..ResolutionMetadata::default()
                },
            ),
        };

        Self {
            context: RESOLUTION_CONTEXT.to_string(),
            did_document,
            did_document_metadata: Map::new(),
            did_resolution_metadata,
        }
    }
}

/// [`DidResolver`] backed by a [`LedgerService`].
#[derive(Clone, Debug)]
pub struct LedgerDidResolver<T: LedgerTransport> {
    service: LedgerService<T>,
}

impl<T: LedgerTransport> LedgerDidResolver<T> {
    /// Create a resolver.
    pub const fn new(service: LedgerService<T>) -> Self {
        Self { service }
    }
}

impl<T: LedgerTransport> DidResolver for LedgerDidResolver<T> {
    async fn resolve(&self, did: &str) -> Resolution {
        self.service.resolve(did).await.into()
    }

    fn supported_methods(&self) -> Vec<String> {
        self.service.registry().names().map(ToString::to_string).collect()
    }

    // Every resolution re-reads the ledger.
    fn allows_caching(&self) -> bool {
        false
    }
}
