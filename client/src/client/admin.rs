//! Admin bindings: info, config, version discovery, operations, join, backup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::FedimintClient;
use crate::context::Override;
use crate::error::Result;

// ─── Request/Response types ──────────────────────────────────────────────────

/// Per-federation wallet summary, keyed by federation id in [`InfoResponse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationInfo {
    pub network: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    pub total_amount_msat: u64,
    pub total_num_notes: usize,
    /// Denomination breakdown; its shape differs between daemon versions.
    #[serde(default)]
    pub denominations_msat: Value,
}

pub type InfoResponse = BTreeMap<String, FederationInfo>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutput {
    pub id: String,
    pub creation_time: String,
    pub operation_kind: String,
    pub operation_meta: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOperationsResponse {
    pub operations: Vec<OperationOutput>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationIdsResponse {
    pub federation_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub this_federation_id: String,
    pub federation_ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverVersionRequest {
    threshold: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOperationsRequest {
    limit: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest<'a> {
    invite_code: &'a str,
    use_manual_secret: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupRequest<'a> {
    metadata: &'a BTreeMap<String, String>,
}

/// What to do after joining a federation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOptions {
    pub invite_code: String,
    pub set_active_federation_id: bool,
    pub use_default_gateway: bool,
    pub use_manual_secret: bool,
}

impl JoinOptions {
    pub fn new(invite_code: impl Into<String>) -> Self {
        Self {
            invite_code: invite_code.into(),
            set_active_federation_id: false,
            use_default_gateway: false,
            use_manual_secret: false,
        }
    }

    /// Adopt the joined federation as the active one.
    pub fn set_active_federation_id(mut self) -> Self {
        self.set_active_federation_id = true;
        self
    }

    /// After adopting, select the federation's first gateway as active.
    /// Has no effect without [`Self::set_active_federation_id`].
    pub fn use_default_gateway(mut self) -> Self {
        self.use_default_gateway = true;
        self
    }

    pub fn use_manual_secret(mut self) -> Self {
        self.use_manual_secret = true;
        self
    }
}

// ─── Bindings ────────────────────────────────────────────────────────────────

impl FedimintClient {
    /// `GET /admin/info`
    pub async fn info(&self) -> Result<InfoResponse> {
        self.get("/admin/info").await
    }

    /// `GET /admin/config`
    pub async fn config(&self) -> Result<Value> {
        self.get("/admin/config").await
    }

    /// `POST /admin/discover-version`
    pub async fn discover_version(&self, threshold: u16) -> Result<Value> {
        self.post("/admin/discover-version", &DiscoverVersionRequest { threshold })
            .await
    }

    /// `POST /admin/list-operations`: the `limit` most recent operations.
    pub async fn list_operations(
        &self,
        limit: usize,
        federation: Override,
    ) -> Result<ListOperationsResponse> {
        self.post_with_federation(
            "/admin/list-operations",
            ListOperationsRequest { limit },
            &federation,
        )
        .await
    }

    /// `GET /admin/federation-ids`
    pub async fn federation_ids(&self) -> Result<FederationIdsResponse> {
        self.get("/admin/federation-ids").await
    }

    /// `POST /admin/join`
    ///
    /// The remote join always runs. Client state is only touched once it has
    /// succeeded, and only as far as `opts` asks for.
    pub async fn join(&self, opts: JoinOptions) -> Result<JoinResponse> {
        let response: JoinResponse = self
            .post(
                "/admin/join",
                &JoinRequest {
                    invite_code: &opts.invite_code,
                    use_manual_secret: opts.use_manual_secret,
                },
            )
            .await?;
        info!(federation_id = %response.this_federation_id, "Joined federation");

        if opts.set_active_federation_id {
            self.set_active_federation_id(
                response.this_federation_id.clone(),
                opts.use_default_gateway,
            )
            .await?;
        }
        Ok(response)
    }

    /// `POST /admin/backup`: upload an encrypted backup with `metadata`.
    pub async fn backup(
        &self,
        metadata: &BTreeMap<String, String>,
        federation: Override,
    ) -> Result<()> {
        let _: Value = self
            .post_with_federation("/admin/backup", BackupRequest { metadata }, &federation)
            .await?;
        Ok(())
    }

    /// `POST /admin/restore`: recover the federation wallet from its backup.
    pub async fn restore(&self, federation: Override) -> Result<()> {
        let _: Value = self
            .post_with_federation("/admin/restore", (), &federation)
            .await?;
        Ok(())
    }
}
