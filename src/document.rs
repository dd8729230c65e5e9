//! # DID Document
//!
//! A minimal W3C DID Document: one Ed25519 verification method referenced by
//! the `authentication` relationship.
//!
//! The ledger stores raw key material rather than documents, so the primary
//! path is [`DidDocument::build`] from a DID and the ledger's `verkey`.
//! [`DidDocument::parse`] is for payloads that are already document-shaped.

use multibase::Base;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::Result;

/// Base DID context.
pub const DID_CONTEXT: &str = "https://w3id.org/did/v1";

/// Fragment of the single verification method produced for a ledger DID.
pub const KEY_FRAGMENT: &str = "key-1";

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// The context of the DID document.
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,

    /// The DID for a particular DID subject.
    pub id: String,

    /// Verification methods for the DID subject, in order.
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,

    /// IDs of the verification methods the subject authenticates with.
    #[serde(default)]
    pub authentication: Vec<String>,
}

/// A public key bound to the DID subject.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// DID URL identifying the method, e.g. `did:testnet:abc#key-1`.
    pub id: String,

    /// The type of verification method.
    #[serde(rename = "type")]
    pub type_: MethodType,

    /// The DID of the controller of the verification method.
    pub controller: String,

    /// Base58 encoded public key. Stored as received from the ledger.
    pub public_key_base58: String,
}

/// Verification method types supported.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum MethodType {
    /// Ed25519 key as used by ledger `verkey`s.
    #[default]
    Ed25519VerificationKey2018,
}

impl VerificationMethod {
    /// Decode the base58 key value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] if the key is not valid base58.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        Base::Base58Btc
            .decode(&self.public_key_base58)
            .map_err(|e| Error::MalformedDocument(format!("public key is not base58: {e}")))
    }
}

impl DidDocument {
    /// Build the document for a ledger DID and its public key.
    ///
    /// Deterministic: the same inputs always produce the same document.
    #[must_use]
    pub fn build(did: &str, public_key: &str) -> Self {
        let kid = format!("{did}#{KEY_FRAGMENT}");
        DocumentBuilder::new(did)
            .verification_method(VerificationMethod {
                id: kid.clone(),
                type_: MethodType::Ed25519VerificationKey2018,
                controller: did.to_string(),
                public_key_base58: public_key.to_string(),
            })
            .authentication(&kid)
            .build()
    }

    /// Parse a document-shaped JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDocument`] when the payload does not
    /// deserialize, has no `id`, or has no verification methods.
    pub fn parse(raw: &Value) -> Result<Self> {
        let doc = Self::deserialize(raw)
            .map_err(|e| Error::MalformedDocument(format!("issue deserializing document: {e}")))?;
        if doc.id.is_empty() {
            return Err(Error::MalformedDocument("document has no id".into()));
        }
        if doc.verification_method.is_empty() {
            return Err(Error::MalformedDocument(format!(
                "document {} has no verification method",
                doc.id
            )));
        }
        Ok(doc)
    }

    /// Find a verification method by its ID.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// The first method referenced by `authentication`.
    #[must_use]
    pub fn authentication_key(&self) -> Option<&VerificationMethod> {
        self.authentication.iter().find_map(|id| self.verification_method(id))
    }
}

/// A builder for creating a DID Document.
#[derive(Default)]
pub struct DocumentBuilder {
    // Document under construction
    doc: DidDocument,
}

impl DocumentBuilder {
    /// Creates a new `DocumentBuilder` with the given DID and the base DID
    /// context.
    #[must_use]
    pub fn new(did: &str) -> Self {
        let doc = DidDocument {
            context: vec![DID_CONTEXT.to_string()],
            id: did.to_string(),
            ..DidDocument::default()
        };
        Self { doc }
    }

    /// Add a context.
    ///
    /// Chain to add multiple contexts.
    #[must_use]
    pub fn context(mut self, context: &str) -> Self {
        self.doc.context.push(context.to_string());
        self
    }

    /// Add a verification method.
    ///
    /// Chain to add multiple verification methods.
    #[must_use]
    pub fn verification_method(mut self, vm: VerificationMethod) -> Self {
        self.doc.verification_method.push(vm);
        self
    }

    /// Reference a verification method from the `authentication`
    /// relationship.
    #[must_use]
    pub fn authentication(mut self, vm_id: &str) -> Self {
        self.doc.authentication.push(vm_id.to_string());
        self
    }

    /// Build the DID Document.
    #[must_use]
    pub fn build(self) -> DidDocument {
        self.doc
    }
}
