//! # Ledger Transactions
//!
//! Payloads and endpoint paths of the ledger's REST transaction API. The
//! shape of each payload is dictated by the ledger chaincode.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Role assigned to a nym when none is requested.
pub const DEFAULT_ROLE: &str = "TRUST_ANCHOR";

/// Sentinel `verkey` sent when an update leaves the key as is. Interpreted by
/// the ledger, not by this crate.
pub const UNCHANGED_VERKEY: &str = "unchanged";

/// Submit a new transaction.
pub const CREATE_PATH: &str = "/CreateTransaction";

/// Submit an update to an existing nym.
pub const UPDATE_PATH: &str = "/UpdateTransaction";

/// Type of ledger transaction.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    /// DID and verkey registration.
    Nym,
    /// `AnonCreds` schema.
    Schema,
    /// `AnonCreds` credential definition.
    CredentialDefinition,
}

impl TransactionKind {
    /// Name used in request bodies and read paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nym => "nym",
            Self::Schema => "schema",
            Self::CredentialDefinition => "credentialDefinition",
        }
    }
}

/// Operation of a `nym` transaction.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NymOperation {
    /// Method-specific identifier the nym is written for.
    pub dest: String,
    /// Public key bound to the identifier.
    pub verkey: String,
    /// Ledger role.
    pub role: String,
}

/// A transaction bound for a specific network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerTransaction {
    /// Transaction type.
    pub kind: TransactionKind,
    /// Target network name.
    pub network: String,
    /// Transaction content, opaque to this crate.
    pub transaction: Value,
}

impl LedgerTransaction {
    /// A `nym` transaction carrying `operation`.
    #[must_use]
    pub fn nym(network: &str, operation: &NymOperation) -> Self {
        Self {
            kind: TransactionKind::Nym,
            network: network.to_string(),
            transaction: json!({ "operation": operation }),
        }
    }

    /// Body for `POST /CreateTransaction`.
    #[must_use]
    pub fn create_body(&self) -> Value {
        json!({
            "transaction": self.transaction,
            "type": self.kind,
            "network": self.network,
        })
    }

    /// Body for `POST /UpdateTransaction` targeting the object `id`.
    #[must_use]
    pub fn update_body(&self, id: &str) -> Value {
        json!({
            "id": id,
            "type": self.kind,
            "transaction": self.transaction,
        })
    }
}

/// Body of a successful nym read.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReadResponse {
    /// The nym record.
    pub result: NymRecord,
}

/// Nym record as stored on the ledger.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NymRecord {
    /// The DID, when the ledger echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    /// Public key bound to the DID.
    pub verkey: String,
    /// Ledger role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// `GET /ReadTransaction/{id}/{kind}`
#[must_use]
pub fn read_path(id: &str, kind: TransactionKind) -> String {
    format!("/ReadTransaction/{}/{}", encode(id), kind.as_str())
}

/// `DELETE /DeleteTransaction/{id}`
#[must_use]
pub fn delete_path(id: &str) -> String {
    format!("/DeleteTransaction/{}", encode(id))
}

// Percent-encode an identifier for use as a single path segment. Only
// unreserved characters are left as is.
fn encode(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
