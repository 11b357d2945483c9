//! On-chain wallet bindings: peg-in addresses, deposit tracking, withdrawals.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::FedimintClient;
use crate::context::Override;
use crate::error::Result;

// ─── Request/Response types ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressResponse {
    pub operation_id: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweak_idx: Option<u64>,
}

/// Deposit transaction as seen by the federation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinTransactionData {
    pub btc_transaction: Value,
    pub out_idx: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositState {
    WaitingForTransaction,
    WaitingForConfirmation(BitcoinTransactionData),
    Confirmed(BitcoinTransactionData),
    Claimed(BitcoinTransactionData),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwaitDepositResponse {
    pub status: DepositState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub txid: String,
    pub fees_sat: u64,
}

/// Amount to withdraw: a fixed number of sats, or the whole balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawAmount {
    Sats(u64),
    All,
}

impl Serialize for WithdrawAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Sats(sats) => serializer.serialize_u64(*sats),
            Self::All => serializer.serialize_str("all"),
        }
    }
}

impl From<u64> for WithdrawAmount {
    fn from(sats: u64) -> Self {
        Self::Sats(sats)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DepositAddressRequest {
    timeout: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AwaitDepositRequest<'a> {
    operation_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawRequest<'a> {
    address: &'a str,
    amount_sat: WithdrawAmount,
}

// ─── Bindings ────────────────────────────────────────────────────────────────

/// On-chain bindings, borrowed from [`FedimintClient::onchain`].
pub struct OnchainModule<'a> {
    pub(crate) client: &'a FedimintClient,
}

impl OnchainModule<'_> {
    /// `POST /onchain/deposit-address`: address watched for `timeout` seconds.
    pub async fn create_deposit_address(
        &self,
        timeout: u64,
        federation: Override,
    ) -> Result<DepositAddressResponse> {
        self.client
            .post_with_federation(
                "/onchain/deposit-address",
                DepositAddressRequest { timeout },
                &federation,
            )
            .await
    }

    /// `POST /onchain/await-deposit`: wait for the deposit of `operation_id`.
    pub async fn await_deposit(
        &self,
        operation_id: &str,
        federation: Override,
    ) -> Result<AwaitDepositResponse> {
        self.client
            .post_with_federation(
                "/onchain/await-deposit",
                AwaitDepositRequest { operation_id },
                &federation,
            )
            .await
    }

    /// `POST /onchain/withdraw`
    pub async fn withdraw(
        &self,
        address: &str,
        amount: WithdrawAmount,
        federation: Override,
    ) -> Result<WithdrawResponse> {
        self.client
            .post_with_federation(
                "/onchain/withdraw",
                WithdrawRequest {
                    address,
                    amount_sat: amount,
                },
                &federation,
            )
            .await
    }
}
