//! Lightning bindings: gateways, invoices, payments and external-key receives.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::FedimintClient;
use crate::context::Override;
use crate::error::Result;

// ─── Gateway descriptors ─────────────────────────────────────────────────────
//
// Daemon revisions disagree on casing here, so both spellings are accepted.

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    #[serde(alias = "federationId")]
    pub federation_id: String,
    pub info: GatewayInfo,
    #[serde(default)]
    pub vetted: bool,
    #[serde(default)]
    pub ttl: GatewayTtl,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    #[serde(alias = "gatewayId")]
    pub gateway_id: String,
    #[serde(default, alias = "nodePubKey")]
    pub node_pub_key: String,
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub fees: GatewayFees,
    #[serde(default, alias = "lightningAlias")]
    pub lightning_alias: String,
    #[serde(default, alias = "gatewayRedeemKey")]
    pub gateway_redeem_key: String,
    #[serde(default, alias = "mintChannelId")]
    pub mint_channel_id: u64,
    #[serde(default, alias = "routeHints")]
    pub route_hints: Vec<Value>,
    #[serde(default, alias = "supportsPrivatePayments")]
    pub supports_private_payments: bool,
}

/// Routing fee schedule: flat part plus parts-per-million of the amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFees {
    #[serde(alias = "baseMsat")]
    pub base_msat: u32,
    #[serde(alias = "proportionalMillionths")]
    pub proportional_millionths: u32,
}

impl GatewayFees {
    /// Fee in msat charged for routing `amount_msat`.
    pub fn fee_for(&self, amount_msat: u64) -> u64 {
        u64::from(self.base_msat)
            + amount_msat.saturating_mul(u64::from(self.proportional_millionths)) / 1_000_000
    }
}

/// Remaining registration lifetime of a gateway.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayTtl {
    pub secs: u64,
    pub nanos: u32,
}

// ─── Receive / pay states ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LnReceiveState {
    Created,
    WaitingForPayment { invoice: String, timeout: u64 },
    Canceled { reason: String },
    Funded,
    AwaitingFunds,
    Claimed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    /// Paid to another user of the same federation without a gateway.
    Internal(String),
    /// Routed over lightning by a gateway.
    Lightning(String),
}

// ─── Request/Response types ──────────────────────────────────────────────────

/// Amount, description and expiry of an invoice to create.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOptions {
    pub amount_msat: u64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<u64>,
}

impl InvoiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn msats(mut self, msats: u64) -> Self {
        self.amount_msat = msats;
        self
    }

    pub fn sats(mut self, sats: u64) -> Self {
        self.amount_msat = sats.saturating_mul(1000);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Invoice expiry in seconds.
    pub fn expiry_time(mut self, expiry_time: u64) -> Self {
        self.expiry_time = Some(expiry_time);
        self
    }
}

/// Payment descriptor (bolt11 invoice, LNURL or lightning address) to pay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayOptions {
    pub payment_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_msat: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lnurl_comment: Option<String>,
}

impl PayOptions {
    pub fn new(payment_info: impl Into<String>) -> Self {
        Self {
            payment_info: payment_info.into(),
            ..Self::default()
        }
    }

    /// Amount for descriptors that carry none (LNURL, lightning address).
    pub fn msats(mut self, msats: u64) -> Self {
        self.amount_msat = Some(msats);
        self
    }

    pub fn sats(mut self, sats: u64) -> Self {
        self.amount_msat = Some(sats.saturating_mul(1000));
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.lnurl_comment = Some(comment.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub operation_id: String,
    pub invoice: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStatusResponse {
    pub status: LnReceiveState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    pub operation_id: String,
    pub payment_type: PayType,
    pub contract_id: String,
    pub fee: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preimage: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalPubkeyInvoiceRequest<'a> {
    #[serde(flatten)]
    invoice: &'a InvoiceOptions,
    external_pubkey: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweak: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimExternalReceiveRequest<'a> {
    private_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweaks: Option<&'a [u64]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationRequest<'a> {
    operation_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchGatewayRequest<'a> {
    gateway_id: &'a str,
}

// ─── Bindings ────────────────────────────────────────────────────────────────

/// Lightning bindings, borrowed from [`FedimintClient::ln`].
pub struct LnModule<'a> {
    pub(crate) client: &'a FedimintClient,
}

impl LnModule<'_> {
    /// `POST /ln/list-gateways`: gateways registered with the federation, in
    /// daemon order.
    pub async fn list_gateways(&self, federation: Override) -> Result<Vec<Gateway>> {
        self.client
            .post_with_federation("/ln/list-gateways", (), &federation)
            .await
    }

    /// `POST /ln/invoice`
    pub async fn create_invoice(
        &self,
        opts: InvoiceOptions,
        gateway: Override,
        federation: Override,
    ) -> Result<InvoiceResponse> {
        self.client
            .post_with_federation_and_gateway("/ln/invoice", opts, &gateway, &federation)
            .await
    }

    /// `POST /ln/invoice-external-pubkey`: invoice whose funds are locked to
    /// `external_pubkey` and claimed later with its private key.
    pub async fn create_invoice_for_pubkey(
        &self,
        external_pubkey: &str,
        opts: InvoiceOptions,
        gateway: Override,
        federation: Override,
    ) -> Result<InvoiceResponse> {
        let request = ExternalPubkeyInvoiceRequest {
            invoice: &opts,
            external_pubkey,
            tweak: None,
        };
        self.client
            .post_with_federation_and_gateway(
                "/ln/invoice-external-pubkey",
                request,
                &gateway,
                &federation,
            )
            .await
    }

    /// `POST /ln/invoice-external-pubkey-tweaked`: as above, locked to the
    /// key derived from `external_pubkey` and `tweak`.
    pub async fn create_invoice_for_pubkey_tweak(
        &self,
        external_pubkey: &str,
        tweak: u64,
        opts: InvoiceOptions,
        gateway: Override,
        federation: Override,
    ) -> Result<InvoiceResponse> {
        let request = ExternalPubkeyInvoiceRequest {
            invoice: &opts,
            external_pubkey,
            tweak: Some(tweak),
        };
        self.client
            .post_with_federation_and_gateway(
                "/ln/invoice-external-pubkey-tweaked",
                request,
                &gateway,
                &federation,
            )
            .await
    }

    /// `POST /ln/claim-external-receive`
    pub async fn claim_pubkey_receive(
        &self,
        private_key: &str,
        federation: Override,
    ) -> Result<ReceiveStatusResponse> {
        let request = ClaimExternalReceiveRequest {
            private_key,
            tweaks: None,
        };
        self.client
            .post_with_federation("/ln/claim-external-receive", request, &federation)
            .await
    }

    /// `POST /ln/claim-external-receive-tweaked`: claim every invoice locked
    /// to `private_key` under one of `tweaks`.
    pub async fn claim_pubkey_tweak_receives(
        &self,
        private_key: &str,
        tweaks: &[u64],
        federation: Override,
    ) -> Result<ReceiveStatusResponse> {
        let request = ClaimExternalReceiveRequest {
            private_key,
            tweaks: Some(tweaks),
        };
        self.client
            .post_with_federation("/ln/claim-external-receive-tweaked", request, &federation)
            .await
    }

    /// `POST /ln/await-invoice`: block until the invoice created by
    /// `operation_id` settles or fails.
    pub async fn await_invoice(
        &self,
        operation_id: &str,
        federation: Override,
    ) -> Result<ReceiveStatusResponse> {
        self.client
            .post_with_federation(
                "/ln/await-invoice",
                OperationRequest { operation_id },
                &federation,
            )
            .await
    }

    /// `POST /ln/pay`
    pub async fn pay(
        &self,
        opts: PayOptions,
        gateway: Override,
        federation: Override,
    ) -> Result<PayResponse> {
        self.client
            .post_with_federation_and_gateway("/ln/pay", opts, &gateway, &federation)
            .await
    }

    /// `POST /ln/await-pay`: outcome of a payment started by [`Self::pay`].
    pub async fn await_pay(&self, operation_id: &str, federation: Override) -> Result<PayResponse> {
        self.client
            .post_with_federation("/ln/await-pay", OperationRequest { operation_id }, &federation)
            .await
    }

    /// `POST /ln/switch-gateway`: make `gateway_id` the daemon's active
    /// gateway for the federation.
    ///
    /// The client's active gateway follows only on success, and only when the
    /// call ran against the active federation and that is still active.
    pub async fn switch_gateway(&self, gateway_id: &str, federation: Override) -> Result<Gateway> {
        let federation_id = federation.resolve(
            &self.client.active_federation_id().await,
            "federationId",
        )?;
        let gateway: Gateway = self
            .client
            .post_with_federation(
                "/ln/switch-gateway",
                SwitchGatewayRequest { gateway_id },
                &Override::Explicit(federation_id.clone()),
            )
            .await?;
        if self
            .client
            .adopt_gateway(&federation_id, &gateway.info.gateway_id)
            .await
        {
            info!(gateway_id = %gateway.info.gateway_id, %federation_id, "Switched gateway");
        }
        Ok(gateway)
    }
}
