//! Client SDK for the clientd federated e-cash daemon.
//!
//! Covers the daemon's admin, lightning, mint and on-chain HTTP APIs. Calls
//! scoped to a federation (and gateway) fill in the client's active ids unless
//! the caller passes an explicit [`Override`].

pub mod client;
pub mod context;
pub mod error;
pub mod keys;
pub mod transport;

pub use client::admin::{
    FederationIdsResponse, FederationInfo, InfoResponse, JoinOptions, JoinResponse,
    ListOperationsResponse, OperationOutput,
};
pub use client::ln::{
    Gateway, GatewayFees, GatewayInfo, GatewayTtl, InvoiceOptions, InvoiceResponse,
    LnReceiveState, PayOptions, PayResponse, PayType, ReceiveStatusResponse,
};
pub use client::mint::{
    AmountResponse, DecodeNotesResponse, NotesJson, NotesResponse, SpendOptions, SpendResponse,
    SpendableNote, SplitResponse,
};
pub use client::onchain::{
    AwaitDepositResponse, DepositAddressResponse, DepositState, WithdrawAmount, WithdrawResponse,
};
pub use client::{FedimintClient, FedimintClientBuilder};
pub use context::{ClientContext, Override};
pub use error::{Error, Result};
pub use keys::KeyPair;
