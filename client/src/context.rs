//! Federation and gateway context, and the request envelopes that carry it.
//!
//! Each binding resolves its identifiers once, from an immutable
//! [`ClientContext`] snapshot taken at call start, then wraps its typed payload
//! in [`WithFederation`] or [`WithFederationAndGateway`]. The payload is moved
//! into the envelope and flattened on serialization, so the caller's value is
//! never edited in place.
//!
//! Payloads that serialize as unit or `None` contribute no fields. Scalars and
//! sequences cannot be flattened into an object and fail with
//! [`Error::Serialization`] when the envelope is encoded.

use serde::Serialize;

use crate::error::{Error, Result};

/// Per-call identifier override.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Override {
    /// Use this identifier for the call.
    Explicit(String),
    /// Fall back to the client's active identifier.
    #[default]
    UseDefault,
}

impl Override {
    /// Resolve against `default`. An empty effective id is rejected so that no
    /// request goes out with a blank identifier.
    pub fn resolve(&self, default: &str, name: &'static str) -> Result<String> {
        let id = match self {
            Self::Explicit(id) => id.as_str(),
            Self::UseDefault => default,
        };
        if id.is_empty() {
            return Err(Error::MissingIdentifier(name));
        }
        Ok(id.to_string())
    }
}

impl From<Option<String>> for Override {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(id) => Self::Explicit(id),
            None => Self::UseDefault,
        }
    }
}

impl From<String> for Override {
    fn from(id: String) -> Self {
        Self::Explicit(id)
    }
}

impl From<&str> for Override {
    fn from(id: &str) -> Self {
        Self::Explicit(id.to_string())
    }
}

/// The client-wide defaults a call resolves its identifiers from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    pub active_federation_id: String,
    pub active_gateway_id: String,
}

impl ClientContext {
    pub fn new(active_federation_id: impl Into<String>) -> Self {
        Self {
            active_federation_id: active_federation_id.into(),
            active_gateway_id: String::new(),
        }
    }

    pub fn with_federation<T: Serialize>(
        &self,
        payload: T,
        federation: &Override,
    ) -> Result<WithFederation<T>> {
        Ok(WithFederation {
            payload,
            federation_id: federation.resolve(&self.active_federation_id, "federationId")?,
        })
    }

    pub fn with_federation_and_gateway<T: Serialize>(
        &self,
        payload: T,
        federation: &Override,
        gateway: &Override,
    ) -> Result<WithFederationAndGateway<T>> {
        Ok(WithFederationAndGateway {
            payload,
            federation_id: federation.resolve(&self.active_federation_id, "federationId")?,
            gateway_id: gateway.resolve(&self.active_gateway_id, "gatewayId")?,
        })
    }
}

/// Payload plus the effective `federationId`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithFederation<T> {
    #[serde(flatten)]
    pub payload: T,
    pub federation_id: String,
}

/// Payload plus the effective `federationId` and `gatewayId`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithFederationAndGateway<T> {
    #[serde(flatten)]
    pub payload: T,
    pub federation_id: String,
    pub gateway_id: String,
}
