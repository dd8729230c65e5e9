//! # Ledger DIDs
//!
//! Identifiers have the form `did:<network>:<methodSpecificId>`, where the
//! method segment names a configured ledger network. Everything after the
//! second `:` is the method-specific identifier, taken as is.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

static DID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^did:(?<network>[^:]+):(?<id>.+)$").expect("should compile")
});

/// A parsed ledger DID.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Did {
    /// Network (DID method) segment.
    pub network: String,

    /// Network-assigned identifier. Opaque to this crate.
    pub method_specific_id: String,
}

impl Did {
    /// Compose a DID from its parts.
    #[must_use]
    pub fn new(network: impl Into<String>, method_specific_id: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            method_specific_id: method_specific_id.into(),
        }
    }

    /// The final `:`-delimited segment of the identifier. Used as the `dest`
    /// of nym transactions.
    #[must_use]
    pub fn suffix(&self) -> &str {
        self.method_specific_id
            .rsplit_once(':')
            .map_or(self.method_specific_id.as_str(), |(_, suffix)| suffix)
    }
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(caps) = DID_REGEX.captures(s) else {
            return Err(Error::InvalidDid(format!("'{s}' is not of the form did:<network>:<id>")));
        };
        Ok(Self::new(&caps["network"], &caps["id"]))
    }
}

impl Display for Did {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.network, self.method_specific_id)
    }
}
