//! Cross-crate integration tests exercising the full pipeline:
//! mnemonic -> wallet -> sign -> verify, and wallet -> node submission.
//!
//! These go through the public API of wallet_core only, to catch
//! regressions at crate boundaries.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tezos_rpc::{RpcError, Transport};
use wallet_core::*;

const PHRASE: &str =
    "feed ring nasty mean soon left mad certain rebel empty permit like session clutch robust";
const EMAIL: &str = "watylroc.pcatxegk@tezos.example.org";
const PASSWORD: &str = "UBoCoEMCuS";
const ADDRESS: &str = "tz1hmK2ru6ism15MxXbnhKWWKGJ6hqWssMc5";
const EDPK: &str = "edpkuAasC4JJhAP8r6uLt4hrXojaUrwp4Eq5WeazGHXcaCVvtR9Y6Q";
const DIGEST_HEX: &str = "9d1451bf0f87efb30aa0e5b991174e427f047c515e281c5aed58d5e27d280b99";

fn english() -> Wordlist {
    Wordlist::english().unwrap()
}

fn fundraiser_wallet() -> Wallet {
    Wallet::from_fundraiser(&english(), PHRASE, EMAIL, PASSWORD).unwrap()
}

// ─── Identity: mnemonic -> address ─────────────────────────────────

#[test]
fn mnemonic_and_seed_agree_on_address() {
    let from_mnemonic = fundraiser_wallet();
    let from_seed = Wallet::from_seed(from_mnemonic.seed().expose()).unwrap();

    assert_eq!(from_mnemonic.address(), ADDRESS);
    assert_eq!(from_seed.address(), ADDRESS);
    assert_eq!(from_seed.public_key().unwrap(), EDPK);
    assert!(check_address(from_seed.address()));
}

#[test]
fn address_validation() {
    assert!(check_address(ADDRESS));
    assert!(!check_address("tz1.GoodHash.BadHash.ImTheGuyWithTheGun."));
}

// ─── Signing: sign -> verify ───────────────────────────────────────

#[test]
fn signature_verifies_against_watermarked_digest() {
    let wallet = fundraiser_wallet();
    let signed = wallet.sign("deadbeef", Some(Watermark::Generic)).unwrap();

    assert!(signed.encoded_signature.starts_with("edsig"));
    assert!(signed.signed_hex.starts_with("deadbeef"));

    // Verification runs over the raw message, so it only matches the digest
    // that was actually signed.
    assert!(verify_signature(DIGEST_HEX, &signed.signature, EDPK).unwrap());
    assert!(!verify_signature("deadbeef", &signed.signature, EDPK).unwrap());
}

#[test]
fn unwatermarked_signature_verifies_against_its_digest() {
    let wallet = fundraiser_wallet();
    let signed = wallet.sign("cafe", None).unwrap();

    let digest_hex = hex_of_digest(&signed);
    assert!(verify_signature(&digest_hex, &signed.signature, &wallet.public_key().unwrap()).unwrap());
}

fn hex_of_digest(signed: &SignedMessage) -> String {
    // payload_hash is the unprefixed Base58Check of the digest.
    let bytes = chain_tezos::base58check::decode(&signed.payload_hash(), &[]).unwrap();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ─── Node submission through the wallet ────────────────────────────

#[derive(Default)]
struct CannedNode {
    replies: HashMap<String, Value>,
    posted: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for CannedNode {
    async fn get(&self, path: &str) -> Result<Value, RpcError> {
        self.replies
            .get(path)
            .cloned()
            .ok_or_else(|| RpcError::from_status(404, String::new()))
    }

    async fn post(&self, path: &str, _body: &Value) -> Result<Value, RpcError> {
        self.posted.lock().unwrap().push(path.to_string());
        self.replies
            .get(path)
            .cloned()
            .ok_or_else(|| RpcError::from_status(404, String::new()))
    }
}

fn node(transaction_status: &str) -> CannedNode {
    let contract = format!("chains/main/blocks/head/context/contracts/{ADDRESS}");
    let mut replies = HashMap::new();
    replies.insert(
        "chains/main/blocks/head/header".to_string(),
        json!({ "hash": "BLockHead", "protocol": "PsProto" }),
    );
    replies.insert(
        format!("chains/main/blocks/BLockHead/context/contracts/{ADDRESS}"),
        json!({ "counter": "7" }),
    );
    replies.insert(format!("{contract}/manager_key"), json!(EDPK));
    replies.insert(format!("{contract}/balance"), json!("12345678"));
    replies.insert(
        "chains/main/blocks/head/helpers/forge/operations".to_string(),
        json!("0011aabb"),
    );
    replies.insert(
        "chains/main/blocks/head/helpers/preapply/operations".to_string(),
        json!([{ "contents": [{
            "kind": "transaction",
            "metadata": { "operation_result": { "status": transaction_status, "consumed_gas": "10207" } }
        }] }]),
    );
    replies.insert("injection/operation?chain=main".to_string(), json!("ooTransfer"));
    CannedNode {
        replies,
        ..CannedNode::default()
    }
}

#[tokio::test]
async fn wallet_balance_is_reported_in_tez() {
    let rpc = Rpc::new(node("applied"), Chain::Main).unwrap();
    let balance = fundraiser_wallet().balance(&rpc).await.unwrap();
    assert_eq!(balance.to_tez_string(), "12.345678");
}

#[tokio::test]
async fn wallet_transfer_is_injected_when_applied() {
    let rpc = Rpc::new(node("applied"), Chain::Main).unwrap();
    let submission = fundraiser_wallet()
        .transfer(
            &rpc,
            "tz1dstxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
            "0.25".parse().unwrap(),
            MicroTez::from_micro(1300),
            OperationLimits::default(),
        )
        .await
        .unwrap();

    assert_eq!(submission.operation_hash.as_deref(), Some("ooTransfer"));
    assert!(submission.last().unwrap().succeeded);
    assert!(rpc
        .transport()
        .posted
        .lock()
        .unwrap()
        .iter()
        .any(|p| p.starts_with("injection/")));
}

#[tokio::test]
async fn wallet_transfer_is_held_back_when_backtracked() {
    let rpc = Rpc::new(node("backtracked"), Chain::Main).unwrap();
    let submission = fundraiser_wallet()
        .transfer(
            &rpc,
            "tz1dstxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
            MicroTez::from_micro(1),
            MicroTez::ZERO,
            OperationLimits::default(),
        )
        .await
        .unwrap();

    assert!(!submission.injected());
    assert!(!rpc
        .transport()
        .posted
        .lock()
        .unwrap()
        .iter()
        .any(|p| p.starts_with("injection/")));
}
