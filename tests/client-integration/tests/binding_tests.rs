//! Wire shapes of the admin, mint and on-chain bindings.

use std::collections::BTreeMap;

use anyhow::Result;
use clientd_client::{
    DepositState, FedimintClient, NotesJson, Override, SpendOptions, SpendableNote,
    WithdrawAmount,
};
use httpmock::prelude::*;
use serde_json::json;

fn client(server: &MockServer) -> Result<FedimintClient> {
    Ok(FedimintClient::new(&server.base_url(), "password", "F1")?)
}

#[tokio::test]
async fn test_info_is_keyed_by_federation() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/admin/info");
            then.status(200).json_body(json!({
                "F1": {
                    "network": "regtest",
                    "meta": {"federation_name": "Test"},
                    "totalAmountMsat": 12000,
                    "totalNumNotes": 4,
                    "denominationsMsat": {}
                }
            }));
        })
        .await;

    let info = client(&server)?.info().await?;
    assert_eq!(info["F1"].network, "regtest");
    assert_eq!(info["F1"].total_num_notes, 4);
    Ok(())
}

#[tokio::test]
async fn test_discover_version_sends_no_federation() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/admin/discover-version")
                .json_body(json!({"threshold": 3}));
            then.status(200).json_body(json!({"F1": {"core": [0, 3]}}));
        })
        .await;

    let versions = client(&server)?.discover_version(3).await?;
    assert_eq!(versions["F1"]["core"][1], 3);
    mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_backup_accepts_empty_body() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/admin/backup").json_body(json!({
                "metadata": {"device": "laptop"},
                "federationId": "F3"
            }));
            then.status(200);
        })
        .await;

    let mut metadata = BTreeMap::new();
    metadata.insert("device".to_string(), "laptop".to_string());
    client(&server)?
        .backup(&metadata, Override::Explicit("F3".into()))
        .await?;
    mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_spend_then_validate() -> Result<()> {
    let server = MockServer::start_async().await;
    let spend = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/mint/spend").json_body(json!({
                "amountMsat": 3000,
                "allowOverpay": true,
                "timeout": 3600,
                "includeInvite": false,
                "federationId": "F1"
            }));
            then.status(200)
                .json_body(json!({"operation": "op9", "notes": "AwEEsd..."}));
        })
        .await;
    let validate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/mint/validate")
                .json_body(json!({"notes": "AwEEsd...", "federationId": "F1"}));
            then.status(200).json_body(json!({"amountMsat": 3072}));
        })
        .await;

    let client = client(&server)?;
    let spent = client
        .mint()
        .spend(
            SpendOptions::new()
                .sats(3)
                .allow_overpay(true)
                .timeout(3600),
            Override::UseDefault,
        )
        .await?;
    assert_eq!(spent.operation, "op9");

    let amount = client
        .mint()
        .validate(&spent.notes, Override::UseDefault)
        .await?;
    assert_eq!(amount.amount_msat, 3072);
    spend.assert_hits_async(1).await;
    validate.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_split_and_combine_are_federation_free() -> Result<()> {
    let server = MockServer::start_async().await;
    let split = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/mint/split")
                .json_body(json!({"notes": "bundle"}));
            then.status(200)
                .json_body(json!({"notes": {"1024": "a", "2048": "b"}}));
        })
        .await;
    let combine = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/mint/combine")
                .json_body(json!({"notesVec": ["a", "b"]}));
            then.status(200).json_body(json!({"notes": "bundle"}));
        })
        .await;

    let client = client(&server)?;
    let parts = client.mint().split("bundle").await?;
    assert_eq!(parts.notes.keys().copied().collect::<Vec<_>>(), vec![1024, 2048]);

    let pieces: Vec<String> = parts.notes.into_values().collect();
    let combined = client.mint().combine(&pieces).await?;
    assert_eq!(combined.notes, "bundle");
    split.assert_hits_async(1).await;
    combine.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_decode_then_encode_notes() -> Result<()> {
    let server = MockServer::start_async().await;
    let notes_json = json!({
        "federation_id_prefix": "15db8cb4",
        "notes": {"1024": [{"signature": "s1", "spend_key": "k1"}]}
    });
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/mint/decode-notes")
                .json_body(json!({"notes": "AwEE"}));
            then.status(200)
                .json_body(json!({"notesJson": notes_json.clone()}));
        })
        .await;
    let encode = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/mint/encode-notes")
                .body_contains("notesJsonStr")
                .body_contains("spend_key");
            then.status(200).json_body(json!({"notes": "AwEE"}));
        })
        .await;

    let client = client(&server)?;
    let decoded = client.mint().decode_notes("AwEE").await?;
    let mut expected = BTreeMap::new();
    expected.insert(
        "1024".to_string(),
        vec![SpendableNote {
            signature: "s1".into(),
            spend_key: "k1".into(),
        }],
    );
    assert_eq!(
        decoded.notes_json,
        NotesJson {
            federation_id_prefix: "15db8cb4".into(),
            notes: expected,
        }
    );
    assert_eq!(decoded.notes_json.total_amount_msat(), 1024);

    let encoded = client.mint().encode_notes(&decoded.notes_json).await?;
    assert_eq!(encoded.notes, "AwEE");
    encode.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_deposit_address_and_await_deposit() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/onchain/deposit-address")
                .json_body(json!({"timeout": 600, "federationId": "F1"}));
            then.status(200).json_body(json!({
                "operationId": "op3",
                "address": "bcrt1qdeposit",
                "tweakIdx": 0
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/onchain/await-deposit")
                .json_body(json!({"operationId": "op3", "federationId": "F1"}));
            then.status(200).json_body(json!({"status": {"Failed": "timeout"}}));
        })
        .await;

    let client = client(&server)?;
    let deposit = client
        .onchain()
        .create_deposit_address(600, Override::UseDefault)
        .await?;
    assert_eq!(deposit.address, "bcrt1qdeposit");
    assert_eq!(deposit.tweak_idx, Some(0));

    let status = client
        .onchain()
        .await_deposit(&deposit.operation_id, Override::UseDefault)
        .await?;
    assert_eq!(status.status, DepositState::Failed("timeout".into()));
    Ok(())
}

#[tokio::test]
async fn test_withdraw_all() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/onchain/withdraw").json_body(json!({
                "address": "bcrt1qdest",
                "amountSat": "all",
                "federationId": "F1"
            }));
            then.status(200)
                .json_body(json!({"txid": "ab12", "feesSat": 141}));
        })
        .await;

    let res = client(&server)?
        .onchain()
        .withdraw("bcrt1qdest", WithdrawAmount::All, Override::UseDefault)
        .await?;
    assert_eq!(res.fees_sat, 141);
    mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_malformed_response_is_a_decode_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2/admin/federation-ids");
            then.status(200).body("not json");
        })
        .await;

    let err = client(&server)?.federation_ids().await.unwrap_err();
    assert!(matches!(err, clientd_client::Error::Deserialization(_)));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_daemon_is_a_transport_error() -> Result<()> {
    let client = FedimintClient::new("http://127.0.0.1:1", "password", "F1")?;
    let err = client.federation_ids().await.unwrap_err();
    assert!(matches!(err, clientd_client::Error::Transport(_)));
    assert_eq!(err.status(), None);
    Ok(())
}
