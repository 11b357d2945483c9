//! The clientd SDK client.
//!
//! Holds the transport and the mutable federation/gateway defaults. Bindings
//! live in the per-area submodules: admin calls are methods on
//! [`FedimintClient`] itself, the rest hang off [`FedimintClient::ln`],
//! [`FedimintClient::mint`] and [`FedimintClient::onchain`].
//!
//! ```no_run
//! # async fn demo() -> clientd_client::Result<()> {
//! use clientd_client::{FedimintClient, InvoiceOptions, Override};
//!
//! let client = FedimintClient::new("http://127.0.0.1:3333", "password", "15db8cb4...")?;
//! client.select_default_gateway().await?;
//! let invoice = client
//!     .ln()
//!     .create_invoice(
//!         InvoiceOptions::new().sats(10).description("coffee"),
//!         Override::UseDefault,
//!         Override::UseDefault,
//!     )
//!     .await?;
//! println!("{}", invoice.invoice);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod ln;
pub mod mint;
pub mod onchain;

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::context::{ClientContext, Override};
use crate::error::{Error, Result};
use crate::transport::Transport;

use self::ln::{Gateway, LnModule};
use self::mint::MintModule;
use self::onchain::OnchainModule;

/// Client for one clientd daemon.
///
/// `Send + Sync`; share it behind an `Arc`. Every binding snapshots the
/// context once when it starts, so concurrent context changes never mix ids
/// from two different states into one request.
pub struct FedimintClient {
    transport: Transport,
    context: RwLock<ClientContext>,
}

impl FedimintClient {
    /// Client with the given base URL, credential and initial federation.
    pub fn new(
        base_url: &str,
        password: &str,
        active_federation_id: impl Into<String>,
    ) -> Result<Self> {
        Self::builder()
            .base_url(base_url)
            .password(password)
            .active_federation_id(active_federation_id)
            .build()
    }

    pub fn builder() -> FedimintClientBuilder {
        FedimintClientBuilder::default()
    }

    /// Base URL including the `/v2` prefix.
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn ln(&self) -> LnModule<'_> {
        LnModule { client: self }
    }

    pub fn mint(&self) -> MintModule<'_> {
        MintModule { client: self }
    }

    pub fn onchain(&self) -> OnchainModule<'_> {
        OnchainModule { client: self }
    }

    // ─── Context ─────────────────────────────────────────────────────────────

    /// Immutable copy of the current defaults.
    pub async fn context(&self) -> ClientContext {
        self.context.read().await.clone()
    }

    pub async fn active_federation_id(&self) -> String {
        self.context.read().await.active_federation_id.clone()
    }

    pub async fn active_gateway_id(&self) -> String {
        self.context.read().await.active_gateway_id.clone()
    }

    pub async fn set_active_gateway_id(&self, gateway_id: impl Into<String>) {
        let gateway_id = gateway_id.into();
        info!(%gateway_id, "Changed active gateway id");
        self.context.write().await.active_gateway_id = gateway_id;
    }

    /// Switch the active federation.
    ///
    /// Gateway ids are federation-specific, so the active gateway is either
    /// re-derived with [`Self::select_default_gateway`] or cleared.
    pub async fn set_active_federation_id(
        &self,
        federation_id: impl Into<String>,
        use_default_gateway: bool,
    ) -> Result<()> {
        let federation_id = federation_id.into();
        {
            let mut ctx = self.context.write().await;
            ctx.active_federation_id.clone_from(&federation_id);
            ctx.active_gateway_id.clear();
        }
        info!(%federation_id, "Changed active federation id");

        if use_default_gateway {
            self.select_default_gateway().await?;
        } else {
            info!("Cleared active gateway id; pass one explicitly or select a default gateway");
        }
        Ok(())
    }

    /// List the active federation's gateways and make the first one active.
    ///
    /// Fails with [`Error::NoGatewaysAvailable`] on an empty list, leaving the
    /// active gateway unchanged.
    pub async fn select_default_gateway(&self) -> Result<Gateway> {
        let federation_id = self.active_federation_id().await;
        let gateways = self
            .ln()
            .list_gateways(Override::Explicit(federation_id.clone()))
            .await?;

        let Some(first) = gateways.into_iter().next() else {
            warn!(%federation_id, "No gateways available");
            return Err(Error::NoGatewaysAvailable);
        };

        if self
            .adopt_gateway(&federation_id, &first.info.gateway_id)
            .await
        {
            info!(gateway_id = %first.info.gateway_id, %federation_id, "Selected default gateway");
        }
        Ok(first)
    }

    /// Make `gateway_id` active if `federation_id` is still the active
    /// federation. Returns whether the gateway was stored.
    pub(crate) async fn adopt_gateway(&self, federation_id: &str, gateway_id: &str) -> bool {
        let mut ctx = self.context.write().await;
        if ctx.active_federation_id != federation_id {
            warn!(
                %federation_id,
                %gateway_id,
                current = %ctx.active_federation_id,
                "Gateway belongs to an inactive federation; keeping current gateway"
            );
            return false;
        }
        ctx.active_gateway_id = gateway_id.to_string();
        true
    }

    // ─── Request helpers ─────────────────────────────────────────────────────

    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let bytes = self.transport.send(Method::GET, path, None).await?;
        decode(&bytes)
    }

    pub(crate) async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(Error::Serialization)?;
        let bytes = self.transport.send(Method::POST, path, Some(body)).await?;
        decode(&bytes)
    }

    pub(crate) async fn post_with_federation<B, R>(
        &self,
        path: &str,
        body: B,
        federation: &Override,
    ) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let envelope = self.context().await.with_federation(body, federation)?;
        self.post(path, &envelope).await
    }

    pub(crate) async fn post_with_federation_and_gateway<B, R>(
        &self,
        path: &str,
        body: B,
        gateway: &Override,
        federation: &Override,
    ) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let envelope = self
            .context()
            .await
            .with_federation_and_gateway(body, federation, gateway)?;
        self.post(path, &envelope).await
    }
}

/// Decode a response body. An empty body decodes as JSON `null`, which lets
/// endpoints that answer with nothing bind to `()`.
fn decode<R: DeserializeOwned>(bytes: &[u8]) -> Result<R> {
    let bytes = if bytes.is_empty() { b"null".as_slice() } else { bytes };
    serde_json::from_slice(bytes).map_err(Error::Deserialization)
}

// ─── Builder ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FedimintClientBuilder {
    base_url: Option<String>,
    password: Option<String>,
    active_federation_id: String,
    active_gateway_id: String,
    timeout: Option<Duration>,
}

impl FedimintClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn active_federation_id(mut self, federation_id: impl Into<String>) -> Self {
        self.active_federation_id = federation_id.into();
        self
    }

    pub fn active_gateway_id(mut self, gateway_id: impl Into<String>) -> Self {
        self.active_gateway_id = gateway_id.into();
        self
    }

    /// Per-request timeout. Unset by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<FedimintClient> {
        let base_url = self
            .base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::Config("base_url must be set".to_string()))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Config("password must be set".to_string()))?;

        Ok(FedimintClient {
            transport: Transport::new(&base_url, &password, self.timeout)?,
            context: RwLock::new(ClientContext {
                active_federation_id: self.active_federation_id,
                active_gateway_id: self.active_gateway_id,
            }),
        })
    }
}
