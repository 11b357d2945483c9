//! Mint bindings: spending, validating, reissuing and reshaping e-cash notes.
//!
//! Notes travel as an opaque OOB string. [`NotesJson`] is the decoded form;
//! the daemon converts between the two, this crate never checks signatures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FedimintClient;
use crate::context::Override;
use crate::error::{Error, Result};

// ─── Note bundles ────────────────────────────────────────────────────────────

/// Decoded note bundle: denomination (msat, as a string key) to notes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesJson {
    pub federation_id_prefix: String,
    pub notes: BTreeMap<String, Vec<SpendableNote>>,
}

impl NotesJson {
    /// Face value in msat. Malformed denomination keys count as zero and the
    /// total saturates at `u64::MAX`.
    pub fn total_amount_msat(&self) -> u64 {
        self.notes
            .iter()
            .map(|(denomination, notes)| {
                denomination
                    .parse::<u64>()
                    .unwrap_or(0)
                    .saturating_mul(notes.len() as u64)
            })
            .fold(0u64, u64::saturating_add)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendableNote {
    pub signature: String,
    pub spend_key: String,
}

// ─── Request/Response types ──────────────────────────────────────────────────

/// Parameters of a spend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendOptions {
    pub amount_msat: u64,
    /// Accept handing out more than `amount_msat` if exact change is missing.
    pub allow_overpay: bool,
    /// Seconds before unclaimed notes are reclaimed by the spender.
    pub timeout: u64,
    pub include_invite: bool,
}

impl SpendOptions {
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

    pub fn allow_overpay(mut self, allow_overpay: bool) -> Self {
        self.allow_overpay = allow_overpay;
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn include_invite(mut self, include_invite: bool) -> Self {
        self.include_invite = include_invite;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendResponse {
    #[serde(alias = "operationId")]
    pub operation: String,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountResponse {
    pub amount_msat: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResponse {
    /// One single-denomination bundle per denomination (msat).
    pub notes: BTreeMap<u64, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesResponse {
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeNotesResponse {
    pub notes_json: NotesJson,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesRequest<'a> {
    notes: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CombineRequest<'a> {
    notes_vec: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodeNotesRequest {
    notes_json_str: String,
}

impl EncodeNotesRequest {
    fn new(notes: &NotesJson) -> Result<Self> {
        Ok(Self {
            notes_json_str: serde_json::to_string(notes).map_err(Error::Serialization)?,
        })
    }
}

// ─── Bindings ────────────────────────────────────────────────────────────────

/// Mint bindings, borrowed from [`FedimintClient::mint`].
pub struct MintModule<'a> {
    pub(crate) client: &'a FedimintClient,
}

impl MintModule<'_> {
    /// `POST /mint/spend`: take notes worth `amount_msat` out of the wallet.
    pub async fn spend(&self, opts: SpendOptions, federation: Override) -> Result<SpendResponse> {
        self.client
            .post_with_federation("/mint/spend", opts, &federation)
            .await
    }

    /// `POST /mint/validate`: face value of `notes`, without redeeming them.
    pub async fn validate(&self, notes: &str, federation: Override) -> Result<AmountResponse> {
        self.client
            .post_with_federation("/mint/validate", NotesRequest { notes }, &federation)
            .await
    }

    /// `POST /mint/reissue`: redeem `notes` into this wallet.
    pub async fn reissue(&self, notes: &str, federation: Override) -> Result<AmountResponse> {
        self.client
            .post_with_federation("/mint/reissue", NotesRequest { notes }, &federation)
            .await
    }

    /// `POST /mint/split`
    pub async fn split(&self, notes: &str) -> Result<SplitResponse> {
        self.client
            .post("/mint/split", &NotesRequest { notes })
            .await
    }

    /// `POST /mint/combine`: merge several bundles of one federation.
    pub async fn combine(&self, notes_vec: &[String]) -> Result<NotesResponse> {
        self.client
            .post("/mint/combine", &CombineRequest { notes_vec })
            .await
    }

    /// `POST /mint/encode-notes`: decoded form back to the OOB string.
    pub async fn encode_notes(&self, notes: &NotesJson) -> Result<NotesResponse> {
        self.client
            .post("/mint/encode-notes", &EncodeNotesRequest::new(notes)?)
            .await
    }

    /// `POST /mint/decode-notes`
    pub async fn decode_notes(&self, notes: &str) -> Result<DecodeNotesResponse> {
        self.client
            .post("/mint/decode-notes", &NotesRequest { notes })
            .await
    }
}
