//! JSON endpoints adapting request parameters to clientd SDK bindings.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use clientd_client::{
    AmountResponse, AwaitDepositResponse, DecodeNotesResponse, DepositAddressResponse, Error,
    FederationIdsResponse, Gateway, InfoResponse, InvoiceOptions, InvoiceResponse, JoinOptions,
    JoinResponse, KeyPair, ListOperationsResponse, NotesJson, NotesResponse, Override,
    PayOptions, PayResponse, ReceiveStatusResponse, SpendOptions, SpendResponse, SplitResponse,
    WithdrawAmount, WithdrawResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/admin/info", get(info_handler))
        .route("/admin/config", get(config_handler))
        .route("/admin/federation-ids", get(federation_ids_handler))
        .route("/admin/operations", get(operations_handler))
        .route("/admin/join", post(join_handler))
        .route("/ln/gateways", get(gateways_handler))
        .route("/ln/gateway", post(gateway_handler))
        .route("/ln/invoice", post(invoice_handler))
        .route("/ln/pay", post(pay_handler))
        .route("/ln/await-invoice", post(await_invoice_handler))
        .route("/ln/claim", post(claim_handler))
        .route("/mint/spend", post(spend_handler))
        .route("/mint/validate", post(validate_handler))
        .route("/mint/reissue", post(reissue_handler))
        .route("/mint/split", post(split_handler))
        .route("/mint/combine", post(combine_handler))
        .route("/mint/decode", post(decode_handler))
        .route("/mint/encode", post(encode_handler))
        .route("/onchain/deposit-address", post(deposit_address_handler))
        .route("/onchain/await-deposit", post(await_deposit_handler))
        .route("/onchain/withdraw", post(withdraw_handler))
        .route("/keys/generate", get(keys_handler))
        .layer(cors)
        .with_state(state)
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn status_for(e: &Error) -> StatusCode {
    match e {
        Error::NoGatewaysAvailable => StatusCode::SERVICE_UNAVAILABLE,
        Error::MissingIdentifier(_) | Error::Config(_) | Error::Serialization(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn client_error(e: Error) -> ApiError {
    let status = status_for(&e);
    if status == StatusCode::BAD_GATEWAY {
        error!("clientd call failed: {}", e);
    }
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// Blank form fields mean "use the client default".
fn override_from(id: Option<String>) -> Override {
    Override::from(id.filter(|id| !id.trim().is_empty()))
}

// ─── Request types ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FederationParam {
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    federation_id: Option<String>,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinForm {
    invite_code: String,
    #[serde(default)]
    set_active_federation_id: bool,
    #[serde(default)]
    use_default_gateway: bool,
    #[serde(default)]
    use_manual_secret: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayForm {
    gateway_id: Option<String>,
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceForm {
    amount_msat: u64,
    description: String,
    expiry_time: Option<u64>,
    external_pubkey: Option<String>,
    tweak: Option<u64>,
    gateway_id: Option<String>,
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayForm {
    payment_info: String,
    amount_msat: Option<u64>,
    lnurl_comment: Option<String>,
    gateway_id: Option<String>,
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationForm {
    operation_id: String,
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimForm {
    private_key: String,
    tweaks: Option<Vec<u64>>,
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpendForm {
    amount_msat: u64,
    #[serde(default)]
    allow_overpay: bool,
    #[serde(default = "default_spend_timeout")]
    timeout: u64,
    #[serde(default)]
    include_invite: bool,
    federation_id: Option<String>,
}

fn default_spend_timeout() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotesForm {
    notes: String,
    federation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CombineForm {
    notes_vec: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodeForm {
    notes_json: NotesJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepositAddressForm {
    #[serde(default = "default_deposit_timeout")]
    timeout: u64,
    federation_id: Option<String>,
}

fn default_deposit_timeout() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawForm {
    address: String,
    amount_sat: Option<u64>,
    #[serde(default)]
    all: bool,
    federation_id: Option<String>,
}

impl WithdrawForm {
    fn amount(&self) -> Result<WithdrawAmount, ApiError> {
        match (self.all, self.amount_sat) {
            (true, _) => Ok(WithdrawAmount::All),
            (false, Some(sats)) if sats > 0 => Ok(WithdrawAmount::Sats(sats)),
            _ => Err(bad_request("amountSat is required unless all is set")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    base_url: String,
    active_federation_id: String,
    active_gateway_id: String,
}

// ─── Admin ───────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ctx = state.client.context().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        base_url: state.client.base_url().to_string(),
        active_federation_id: ctx.active_federation_id,
        active_gateway_id: ctx.active_gateway_id,
    })
}

async fn info_handler(State(state): State<Arc<AppState>>) -> ApiResult<InfoResponse> {
    state.client.info().await.map(Json).map_err(client_error)
}

async fn config_handler(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    state.client.config().await.map(Json).map_err(client_error)
}

async fn federation_ids_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<FederationIdsResponse> {
    state
        .client
        .federation_ids()
        .await
        .map(Json)
        .map_err(client_error)
}

async fn operations_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<OperationsQuery>,
) -> ApiResult<ListOperationsResponse> {
    state
        .client
        .list_operations(q.limit, override_from(q.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn join_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<JoinForm>,
) -> ApiResult<JoinResponse> {
    if form.invite_code.trim().is_empty() {
        return Err(bad_request("inviteCode is required"));
    }
    let mut opts = JoinOptions::new(form.invite_code.trim());
    if form.set_active_federation_id {
        opts = opts.set_active_federation_id();
    }
    if form.use_default_gateway {
        opts = opts.use_default_gateway();
    }
    if form.use_manual_secret {
        opts = opts.use_manual_secret();
    }
    state.client.join(opts).await.map(Json).map_err(client_error)
}

// ─── Lightning ───────────────────────────────────────────────────────────────

async fn gateways_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FederationParam>,
) -> ApiResult<Vec<Gateway>> {
    state
        .client
        .ln()
        .list_gateways(override_from(q.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

/// Switch to the named gateway, or select the default one when none is given.
async fn gateway_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<GatewayForm>,
) -> ApiResult<Gateway> {
    let result = match form.gateway_id.filter(|id| !id.trim().is_empty()) {
        Some(gateway_id) => {
            state
                .client
                .ln()
                .switch_gateway(&gateway_id, override_from(form.federation_id))
                .await
        }
        None => state.client.select_default_gateway().await,
    };
    result.map(Json).map_err(client_error)
}

async fn invoice_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<InvoiceForm>,
) -> ApiResult<InvoiceResponse> {
    if form.amount_msat == 0 {
        return Err(bad_request("Amount (msat) is required"));
    }
    if form.description.trim().is_empty() {
        return Err(bad_request("Description is required"));
    }

    let mut opts = InvoiceOptions::new()
        .msats(form.amount_msat)
        .description(form.description);
    if let Some(expiry) = form.expiry_time {
        opts = opts.expiry_time(expiry);
    }
    let gateway = override_from(form.gateway_id);
    let federation = override_from(form.federation_id);
    let ln = state.client.ln();

    let result = match (form.external_pubkey.filter(|k| !k.is_empty()), form.tweak) {
        (Some(pubkey), Some(tweak)) => {
            ln.create_invoice_for_pubkey_tweak(&pubkey, tweak, opts, gateway, federation)
                .await
        }
        (Some(pubkey), None) => {
            ln.create_invoice_for_pubkey(&pubkey, opts, gateway, federation)
                .await
        }
        (None, Some(_)) => return Err(bad_request("tweak requires externalPubkey")),
        (None, None) => ln.create_invoice(opts, gateway, federation).await,
    };
    result.map(Json).map_err(client_error)
}

async fn pay_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PayForm>,
) -> ApiResult<PayResponse> {
    if form.payment_info.trim().is_empty() {
        return Err(bad_request("paymentInfo is required"));
    }
    let mut opts = PayOptions::new(form.payment_info.trim());
    if let Some(msats) = form.amount_msat {
        opts = opts.msats(msats);
    }
    if let Some(comment) = form.lnurl_comment {
        opts = opts.comment(comment);
    }
    state
        .client
        .ln()
        .pay(
            opts,
            override_from(form.gateway_id),
            override_from(form.federation_id),
        )
        .await
        .map(Json)
        .map_err(client_error)
}

async fn await_invoice_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<OperationForm>,
) -> ApiResult<ReceiveStatusResponse> {
    state
        .client
        .ln()
        .await_invoice(&form.operation_id, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn claim_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ClaimForm>,
) -> ApiResult<ReceiveStatusResponse> {
    let federation = override_from(form.federation_id);
    let ln = state.client.ln();
    let result = match form.tweaks {
        Some(tweaks) => {
            ln.claim_pubkey_tweak_receives(&form.private_key, &tweaks, federation)
                .await
        }
        None => ln.claim_pubkey_receive(&form.private_key, federation).await,
    };
    result.map(Json).map_err(client_error)
}

// ─── Mint ────────────────────────────────────────────────────────────────────

async fn spend_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SpendForm>,
) -> ApiResult<SpendResponse> {
    if form.amount_msat == 0 {
        return Err(bad_request("Amount (msat) is required"));
    }
    let opts = SpendOptions::new()
        .msats(form.amount_msat)
        .allow_overpay(form.allow_overpay)
        .timeout(form.timeout)
        .include_invite(form.include_invite);
    state
        .client
        .mint()
        .spend(opts, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NotesForm>,
) -> ApiResult<AmountResponse> {
    state
        .client
        .mint()
        .validate(&form.notes, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn reissue_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NotesForm>,
) -> ApiResult<AmountResponse> {
    state
        .client
        .mint()
        .reissue(&form.notes, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn split_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NotesForm>,
) -> ApiResult<SplitResponse> {
    state
        .client
        .mint()
        .split(&form.notes)
        .await
        .map(Json)
        .map_err(client_error)
}

async fn combine_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CombineForm>,
) -> ApiResult<NotesResponse> {
    if form.notes_vec.is_empty() {
        return Err(bad_request("notesVec must not be empty"));
    }
    state
        .client
        .mint()
        .combine(&form.notes_vec)
        .await
        .map(Json)
        .map_err(client_error)
}

async fn decode_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NotesForm>,
) -> ApiResult<DecodeNotesResponse> {
    state
        .client
        .mint()
        .decode_notes(&form.notes)
        .await
        .map(Json)
        .map_err(client_error)
}

async fn encode_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<EncodeForm>,
) -> ApiResult<NotesResponse> {
    state
        .client
        .mint()
        .encode_notes(&form.notes_json)
        .await
        .map(Json)
        .map_err(client_error)
}

// ─── On-chain ────────────────────────────────────────────────────────────────

async fn deposit_address_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DepositAddressForm>,
) -> ApiResult<DepositAddressResponse> {
    state
        .client
        .onchain()
        .create_deposit_address(form.timeout, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn await_deposit_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<OperationForm>,
) -> ApiResult<AwaitDepositResponse> {
    state
        .client
        .onchain()
        .await_deposit(&form.operation_id, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

async fn withdraw_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<WithdrawForm>,
) -> ApiResult<WithdrawResponse> {
    let amount = form.amount()?;
    state
        .client
        .onchain()
        .withdraw(&form.address, amount, override_from(form.federation_id))
        .await
        .map(Json)
        .map_err(client_error)
}

// ─── Keys ────────────────────────────────────────────────────────────────────

async fn keys_handler() -> Json<KeyPair> {
    Json(KeyPair::generate())
}
