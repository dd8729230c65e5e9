//! # Ledger
//!
//! In-memory state behind the emulators. Implements the ledger's REST
//! transaction contract: nyms keyed by DID, other transactions appended.

use dashmap::DashMap;
use ledger_vdr::Method;
use serde_json::{json, Value};

/// Sentinel `verkey` meaning "keep the current key".
const UNCHANGED: &str = "unchanged";

/// A non-2xx answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl Rejection {
    /// Create a rejection.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// What the ledger does when a nym is created twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Answer `409 Conflict`.
    #[default]
    Reject,
    /// Overwrite the existing nym.
    Accept,
}

/// Ledger state.
#[derive(Debug, Default)]
pub struct Ledger {
    nyms: DashMap<String, Value>,
    objects: DashMap<String, Value>,
    policy: DuplicatePolicy,
    forced: Option<u16>,
}

impl Ledger {
    /// An empty ledger applying `policy` to duplicate nyms.
    #[must_use]
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// A ledger answering every request with `status`.
    #[must_use]
    pub fn rejecting(status: u16) -> Self {
        Self {
            forced: Some(status),
            ..Self::default()
        }
    }

    /// The stored nym for `did`.
    #[must_use]
    pub fn nym(&self, did: &str) -> Option<Value> {
        self.nyms.get(did).map(|r| r.value().clone())
    }

    /// Stored transactions of the given type, other than nyms.
    #[must_use]
    pub fn objects(&self, kind: &str) -> Vec<Value> {
        self.objects
            .iter()
            .filter(|r| r.value()["type"] == kind)
            .map(|r| r.value().clone())
            .collect()
    }

    /// Dispatch a request by method and path.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] the ledger answers with.
    pub fn handle(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, Rejection> {
        if let Some(status) = self.forced {
            return Err(Rejection::new(status, "rejected"));
        }

        match (method, path) {
            (Method::Post, "/CreateTransaction") => self.create(body.unwrap_or(&Value::Null)),
            (Method::Post, "/UpdateTransaction") => self.update(body.unwrap_or(&Value::Null)),
            (Method::Get, p) if p.starts_with("/ReadTransaction/") => {
                let rest = &p["/ReadTransaction/".len()..];
                let Some((id, kind)) = rest.split_once('/') else {
                    return Err(Rejection::new(404, format!("no route for {p}")));
                };
                self.read(&decode(id)?, kind)
            }
            (Method::Delete, p) if p.starts_with("/DeleteTransaction/") => {
                self.delete(&decode(&p["/DeleteTransaction/".len()..])?)
            }
            _ => Err(Rejection::new(404, format!("no route for {method} {path}"))),
        }
    }

    /// `POST /CreateTransaction`
    ///
    /// # Errors
    ///
    /// Returns a rejection for a malformed body or a duplicate nym.
    pub fn create(&self, body: &Value) -> Result<Value, Rejection> {
        let Some(kind) = body["type"].as_str() else {
            return Err(Rejection::new(400, "missing transaction type"));
        };
        let Some(network) = body["network"].as_str() else {
            return Err(Rejection::new(400, "missing network"));
        };

        if kind != "nym" {
            let key = format!("{kind}:{}", self.objects.len());
            self.objects.insert(key, body.clone());
            return Ok(json!({"status": "ok"}));
        }

        let op = &body["transaction"]["operation"];
        let (Some(dest), Some(verkey)) = (op["dest"].as_str(), op["verkey"].as_str()) else {
            return Err(Rejection::new(400, "missing dest or verkey"));
        };
        let did = format!("did:{network}:{dest}");
        if self.policy == DuplicatePolicy::Reject && self.nyms.contains_key(&did) {
            return Err(Rejection::new(409, format!("nym {did} already exists")));
        }

        self.nyms.insert(did.clone(), json!({"did": did, "verkey": verkey, "role": op["role"]}));
        tracing::debug!("stored nym {did}");
        Ok(json!({"status": "ok", "did": did}))
    }

    /// `POST /UpdateTransaction`
    ///
    /// # Errors
    ///
    /// Returns a rejection for a malformed body or an unknown nym.
    pub fn update(&self, body: &Value) -> Result<Value, Rejection> {
        let Some(id) = body["id"].as_str() else {
            return Err(Rejection::new(400, "missing id"));
        };
        let Some(mut record) = self.nyms.get_mut(id) else {
            return Err(Rejection::new(404, format!("nym {id} not found")));
        };

        let op = &body["transaction"]["operation"];
        if let Some(verkey) = op["verkey"].as_str().filter(|v| *v != UNCHANGED) {
            record["verkey"] = json!(verkey);
        }
        if let Some(role) = op["role"].as_str() {
            record["role"] = json!(role);
        }
        Ok(json!({"status": "ok"}))
    }

    /// `GET /ReadTransaction/{id}/{kind}`
    ///
    /// # Errors
    ///
    /// Returns `404` when nothing is stored under `id`.
    pub fn read(&self, id: &str, kind: &str) -> Result<Value, Rejection> {
        if kind != "nym" {
            return Err(Rejection::new(404, format!("{kind} {id} not found")));
        }
        self.nym(id)
            .map(|record| json!({"result": record}))
            .ok_or_else(|| Rejection::new(404, format!("nym {id} not found")))
    }

    /// `DELETE /DeleteTransaction/{id}`
    ///
    /// # Errors
    ///
    /// Returns `404` when nothing is stored under `id`.
    pub fn delete(&self, id: &str) -> Result<Value, Rejection> {
        self.nyms
            .remove(id)
            .map(|_| json!({"status": "ok"}))
            .ok_or_else(|| Rejection::new(404, format!("nym {id} not found")))
    }
}

fn decode(segment: &str) -> Result<String, Rejection> {
    urlencoding::decode(segment)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| Rejection::new(400, format!("invalid path segment: {e}")))
}
