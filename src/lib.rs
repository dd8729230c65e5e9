//! # Ledger VDR
//!
//! A Decentralized Identifier (DID) client for permissioned ledgers that are
//! reachable only through a REST transaction API.
//!
//! DIDs take the form `did:<network>:<methodSpecificId>`, where `<network>`
//! names one of the configured ledger networks. The crate translates DID
//! operations into ledger transactions and ledger responses into minimal
//! W3C DID documents:
//!
//! - [`LedgerService`] creates, resolves, updates and deactivates DIDs and
//!   registers `AnonCreds` schemas and credential definitions.
//! - [`LedgerDidRegistrar`] and [`LedgerDidResolver`] expose the service in
//!   the shapes used by agent frameworks.
//! - [`LedgerModule`] builds all of the above from a [`LedgerConfig`].
//!
//! Operations never fail with an error: every failure is folded into an
//! [`Outcome`] or [`ResolveOutcome`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ledger_vdr::{CreateOptions, LedgerConfig, LedgerModule, Outcome};
//!
//! # async fn run() -> ledger_vdr::Result<()> {
//! let config = LedgerConfig::from_json(
//!     r#"{"networks":[{"name":"testnet","baseUrl":"http://localhost:8000"}]}"#,
//! )?;
//! let module = LedgerModule::new(&config)?;
//!
//! let outcome = module.service().create(CreateOptions::new("demo123", "Verkey123")).await;
//! if let Outcome::Finished(created) = outcome {
//!     println!("created {}", created.did);
//! }
//! # Ok(())
//! # }
//! ```

pub mod anoncreds;
pub mod did;
pub mod document;
pub mod error;
pub mod module;
pub mod network;
pub mod registrar;
pub mod resolver;
pub mod service;
pub mod transaction;
pub mod transport;

pub use self::anoncreds::*;
pub use self::did::Did;
pub use self::document::{DidDocument, DocumentBuilder, MethodType, VerificationMethod};
pub use self::error::Error;
pub use self::module::LedgerModule;
pub use self::network::{LedgerConfig, NetworkConfig, NetworkRegistry};
pub use self::registrar::*;
pub use self::resolver::*;
pub use self::service::*;
pub use self::transaction::{LedgerTransaction, TransactionKind};
pub use self::transport::{HttpTransport, LedgerTransport, Method};

/// Result type for ledger VDR operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
