//! # `AnonCreds` Objects
//!
//! Registration of `AnonCreds` schemas and credential definitions as ledger
//! transactions. Objects are written with the same service, transport and
//! network selection as DIDs.
//!
//! Reading objects back is not offered by the ledger API this crate targets;
//! the read operations report that explicitly.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::did::Did;
use crate::error::Error;
use crate::network::NetworkConfig;
use crate::service::{LedgerService, Outcome};
use crate::transaction::{LedgerTransaction, TransactionKind};
use crate::transport::LedgerTransport;
use crate::Result;

/// Signature type used when a credential definition does not name one.
pub const DEFAULT_SIGNATURE_TYPE: &str = "CL";

/// An `AnonCreds` schema.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// DID of the issuer publishing the schema.
    pub issuer_id: String,

    /// Schema name.
    pub name: String,

    /// Schema version.
    pub version: String,

    /// Attribute names credentials of this schema carry.
    #[serde(default)]
    pub attr_names: Vec<String>,
}

impl Schema {
    /// Ledger identifier: `<issuerId>:2:<name>:<version>`.
    #[must_use]
    pub fn schema_id(&self) -> String {
        format!("{}:2:{}:{}", self.issuer_id, self.name, self.version)
    }
}

/// An `AnonCreds` credential definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinition {
    /// DID of the issuer publishing the definition.
    pub issuer_id: String,

    /// Identifier of the schema the definition is for.
    pub schema_id: String,

    /// Signature type, `CL` unless stated otherwise.
    #[serde(rename = "type", default = "default_signature_type")]
    pub type_: String,

    /// Distinguishes definitions for the same schema and issuer.
    pub tag: String,

    /// Public key material.
    #[serde(default)]
    pub value: CredentialDefinitionValue,
}

/// Key material of a credential definition. Opaque to this crate.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialDefinitionValue {
    /// Primary public key.
    #[serde(default)]
    pub primary: Value,

    /// Revocation public key, if the definition supports revocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<Value>,
}

fn default_signature_type() -> String {
    DEFAULT_SIGNATURE_TYPE.to_string()
}

impl CredentialDefinition {
    /// Ledger identifier: `<issuerId>:3:<type>:<schemaId>:<tag>`.
    #[must_use]
    pub fn credential_definition_id(&self) -> String {
        format!("{}:3:{}:{}:{}", self.issuer_id, self.type_, self.schema_id, self.tag)
    }
}

/// A schema written to the ledger.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredSchema {
    /// Ledger identifier of the schema.
    pub schema_id: String,
    /// The schema as submitted.
    pub schema: Schema,
}

/// A credential definition written to the ledger.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCredentialDefinition {
    /// Ledger identifier of the credential definition.
    pub credential_definition_id: String,
    /// The credential definition as submitted.
    pub credential_definition: CredentialDefinition,
}

impl LedgerTransaction {
    /// A `schema` transaction.
    #[must_use]
    pub fn schema(network: &str, schema: &Schema) -> Self {
        Self {
            kind: TransactionKind::Schema,
            network: network.to_string(),
            transaction: json!({
                "identifier": schema.issuer_id,
                "operation": {
                    "data": {
                        "name": schema.name,
                        "version": schema.version,
                        "attrNames": schema.attr_names,
                    }
                }
            }),
        }
    }

    /// A `credentialDefinition` transaction.
    #[must_use]
    pub fn credential_definition(network: &str, cred_def: &CredentialDefinition) -> Self {
        Self {
            kind: TransactionKind::CredentialDefinition,
            network: network.to_string(),
            transaction: json!({
                "identifier": cred_def.issuer_id,
                "operation": {
                    "ref": cred_def.schema_id,
                    "tag": cred_def.tag,
                    "signature_type": cred_def.type_,
                    "data": {
                        "primary": cred_def.value.primary,
                        "revocation": cred_def.value.revocation,
                    }
                }
            }),
        }
    }
}

impl<T: LedgerTransport> LedgerService<T> {
    /// Write a schema to the ledger.
    pub async fn register_schema(&self, schema: Schema) -> Outcome<RegisteredSchema> {
        let outcome = Outcome::from(self.try_register_schema(schema).await);
        if let Outcome::Failed(reason) = &outcome {
            tracing::error!("failed to register schema: {reason}");
        }
        outcome
    }

    async fn try_register_schema(&self, schema: Schema) -> Result<RegisteredSchema> {
        if schema.issuer_id.is_empty() || schema.name.is_empty() || schema.version.is_empty() {
            return Err(Error::Validation("Missing issuerId, name or version".into()));
        }

        let network = self.issuer_network(&schema.issuer_id)?;
        let tx = LedgerTransaction::schema(&network.name, &schema);
        self.submit(network, &tx).await?;

        let schema_id = schema.schema_id();
        tracing::info!("registered schema {schema_id}");
        Ok(RegisteredSchema { schema_id, schema })
    }

    /// Write a credential definition to the ledger.
    pub async fn register_credential_definition(
        &self, cred_def: CredentialDefinition,
    ) -> Outcome<RegisteredCredentialDefinition> {
        let outcome = Outcome::from(self.try_register_credential_definition(cred_def).await);
        if let Outcome::Failed(reason) = &outcome {
            tracing::error!("failed to register credential definition: {reason}");
        }
        outcome
    }

    async fn try_register_credential_definition(
        &self, cred_def: CredentialDefinition,
    ) -> Result<RegisteredCredentialDefinition> {
        if cred_def.issuer_id.is_empty() || cred_def.schema_id.is_empty() || cred_def.tag.is_empty()
        {
            return Err(Error::Validation("Missing issuerId, schemaId or tag".into()));
        }

        let network = self.issuer_network(&cred_def.issuer_id)?;
        let tx = LedgerTransaction::credential_definition(&network.name, &cred_def);
        self.submit(network, &tx).await?;

        let credential_definition_id = cred_def.credential_definition_id();
        tracing::info!("registered credential definition {credential_definition_id}");
        Ok(RegisteredCredentialDefinition {
            credential_definition_id,
            credential_definition: cred_def,
        })
    }

    /// Read a schema back from the ledger. Not implemented.
    #[allow(clippy::unused_async)]
    pub async fn get_schema(&self, schema_id: &str) -> Outcome<Schema> {
        let err = Error::NotImplemented(format!("reading schema {schema_id}"));
        tracing::warn!("{err}");
        Outcome::Failed(err.to_string())
    }

    /// Read a credential definition back from the ledger. Not implemented.
    #[allow(clippy::unused_async)]
    pub async fn get_credential_definition(
        &self, credential_definition_id: &str,
    ) -> Outcome<CredentialDefinition> {
        let err =
            Error::NotImplemented(format!("reading credential definition {credential_definition_id}"));
        tracing::warn!("{err}");
        Outcome::Failed(err.to_string())
    }

    // The issuer DID's network when configured, otherwise the default.
    fn issuer_network(&self, issuer_id: &str) -> Result<&NetworkConfig> {
        if let Ok(did) = Did::from_str(issuer_id) {
            if let Ok(network) = self.registry().resolve(&did.network) {
                return Ok(network);
            }
        }
        self.network(None)
    }
}
