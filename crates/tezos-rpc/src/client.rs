//! Node client: passthrough queries and the forge, sign, preapply, inject
//! submission pipeline.
//!
//! Each submission is strictly sequential and holds no state between calls.
//! The client does not serialize submissions: two batches for the same
//! account racing on the same counter must be ordered by the caller.

use chain_tezos::{sign, KeyMaterial, SignedMessage, Watermark};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::operation::{BatchBuilder, MicroTez, OperationBatch, OperationLimits};
use crate::result::{OperationResult, ResultHandlers};
use crate::transport::{HttpTransport, Transport};

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// One parsed preapply result per record, in batch order. Returned
    /// whether or not the batch was injected.
    pub results: Vec<OperationResult>,
    /// Hash returned by the injection call; `None` when the gate held the
    /// batch back.
    pub operation_hash: Option<String>,
}

impl Submission {
    pub fn injected(&self) -> bool {
        self.operation_hash.is_some()
    }

    /// Result of the last record, usually the one the caller asked for.
    pub fn last(&self) -> Option<&OperationResult> {
        self.results.last()
    }
}

/// Client for one chain of one node.
#[derive(Debug)]
pub struct Rpc<T> {
    transport: T,
    chain: String,
    handlers: ResultHandlers,
}

impl Rpc<HttpTransport> {
    /// HTTP client for the node and chain named in `config`.
    pub fn connect(config: RpcConfig) -> Result<Self, RpcError> {
        let chain = config.chain.clone();
        Self::new(HttpTransport::new(config)?, chain)
    }
}

impl<T: Transport> Rpc<T> {
    pub fn new(transport: T, chain: impl Into<String>) -> Result<Self, RpcError> {
        let chain = chain.into();
        if chain.trim().is_empty() {
            return Err(RpcError::Configuration("chain required".into()));
        }
        Ok(Self {
            transport,
            chain,
            handlers: ResultHandlers::default(),
        })
    }

    /// Replace the result parser registry.
    pub fn with_handlers(mut self, handlers: ResultHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn handlers_mut(&mut self) -> &mut ResultHandlers {
        &mut self.handlers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn describe(&self) -> Result<Value, RpcError> {
        // The node ignores describe requests without recurse=true.
        self.transport.get("describe?recurse=true").await
    }

    pub async fn head(&self) -> Result<Value, RpcError> {
        self.transport.get(&self.head_path("")).await
    }

    pub async fn header(&self) -> Result<Value, RpcError> {
        self.transport.get(&self.head_path("/header")).await
    }

    pub async fn account_for_block(&self, block_hash: &str, address: &str) -> Result<Value, RpcError> {
        let path = format!(
            "chains/{}/blocks/{}/context/contracts/{}",
            self.chain, block_hash, address
        );
        self.transport.get(&path).await
    }

    pub async fn balance(&self, address: &str) -> Result<MicroTez, RpcError> {
        let reply = self.transport.get(&self.contract_path(address, "/balance")).await?;
        MicroTez::from_micro_str(&scalar_text(&reply, "balance")?)
    }

    pub async fn network_stat(&self) -> Result<Value, RpcError> {
        self.transport.get("network/stat").await
    }

    pub async fn counter(&self, address: &str) -> Result<u64, RpcError> {
        let reply = self.transport.get(&self.contract_path(address, "/counter")).await?;
        parse_counter(&reply)
    }

    pub async fn manager_key(&self, address: &str) -> Result<Value, RpcError> {
        self.transport
            .get(&self.contract_path(address, "/manager_key"))
            .await
    }

    /// Whether `address` has published its public key.
    pub async fn is_revealed(&self, address: &str) -> Result<bool, RpcError> {
        Ok(manager_key_revealed(&self.manager_key(address).await?))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Activate a fundraiser account. The record is anonymous, so it is
    /// submitted with the placeholder signature.
    pub async fn activate(&self, address: &str, secret: &str) -> Result<Submission, RpcError> {
        let batch = BatchBuilder::new().activation(address, secret).build(0)?;
        self.send_operations(&batch, None, None).await
    }

    /// Transfer `amount` from `from` to `to`, revealing `from` first when its
    /// manager key is not yet on chain.
    pub async fn send_transaction(
        &self,
        keys: &KeyMaterial,
        from: &str,
        to: &str,
        amount: MicroTez,
        fee: MicroTez,
        limits: OperationLimits,
    ) -> Result<Submission, RpcError> {
        let header = self.header().await?;
        let block_hash = field_str(&header, "hash")?;

        let account = self.account_for_block(block_hash, from).await?;
        let counter = parse_counter(&account["counter"])?;

        let mut builder = BatchBuilder::new();
        if !self.is_revealed(from).await? {
            debug!(address = from, "manager key not revealed, prepending reveal");
            builder = builder.reveal(from, keys.encoded_public_key()?, limits);
        }
        let batch = builder.transaction(from, to, amount, fee, limits).build(counter)?;

        info!(
            from,
            to,
            amount = %amount.to_tez_string(),
            counter,
            records = batch.len(),
            "sending transaction"
        );
        self.send_operations(&batch, Some(keys), Some(header)).await
    }

    /// Run `batch` through forge, sign, preapply and, if every record
    /// succeeded, inject.
    ///
    /// Without `keys` the batch is sent with the placeholder signature. The
    /// chain header is fetched unless `header` is given.
    pub async fn send_operations(
        &self,
        batch: &OperationBatch,
        keys: Option<&KeyMaterial>,
        header: Option<Value>,
    ) -> Result<Submission, RpcError> {
        let header = match header {
            Some(header) => header,
            None => self.header().await?,
        };
        let branch = field_str(&header, "hash")?;
        let contents = batch.contents()?;

        let forged = self.forge(branch, &contents).await?;

        let signed = match keys {
            Some(keys) => sign(&forged, keys, Some(Watermark::Generic))?,
            None => SignedMessage::unsigned(&forged)?,
        };

        let results = self
            .preapply(&header["protocol"], branch, &contents, &signed.encoded_signature)
            .await?;

        if results.is_empty() || !results.iter().all(|r| r.succeeded) {
            let failed = results.iter().filter(|r| !r.succeeded).count();
            warn!(
                records = results.len(),
                failed,
                "preapply did not succeed for every record, not injecting"
            );
            return Ok(Submission {
                results,
                operation_hash: None,
            });
        }

        let operation_hash = self.inject(&signed.signed_hex).await?;
        info!(%operation_hash, records = results.len(), "operation injected");

        Ok(Submission {
            results,
            operation_hash: Some(operation_hash),
        })
    }

    async fn forge(&self, branch: &str, contents: &Value) -> Result<String, RpcError> {
        let body = json!({ "branch": branch, "contents": contents });
        let reply = self
            .transport
            .post(&self.head_path("/helpers/forge/operations"), &body)
            .await?;

        let forged = reply
            .as_str()
            .ok_or_else(|| RpcError::malformed("forge reply is not a hex string"))?;
        debug!(len = forged.len(), "forged operation");
        Ok(forged.to_string())
    }

    async fn preapply(
        &self,
        protocol: &Value,
        branch: &str,
        contents: &Value,
        signature: &str,
    ) -> Result<Vec<OperationResult>, RpcError> {
        let body = json!([{
            "protocol": protocol,
            "branch": branch,
            "contents": contents,
            "signature": signature,
        }]);
        let reply = self
            .transport
            .post(&self.head_path("/helpers/preapply/operations"), &body)
            .await?;

        self.handlers.parse_preapply(&reply)
    }

    async fn inject(&self, signed_hex: &str) -> Result<String, RpcError> {
        let path = format!("injection/operation?chain={}", self.chain);
        let reply = self
            .transport
            .post(&path, &Value::String(signed_hex.to_string()))
            .await?;

        scalar_text(&reply, "injection")
    }

    fn head_path(&self, suffix: &str) -> String {
        format!("chains/{}/blocks/head{}", self.chain, suffix)
    }

    fn contract_path(&self, address: &str, suffix: &str) -> String {
        self.head_path(&format!("/context/contracts/{address}{suffix}"))
    }
}

/// A manager key counts as revealed when the node returns a key string, or
/// an object whose `key` is set.
pub fn manager_key_revealed(reply: &Value) -> bool {
    match reply {
        Value::String(_) => true,
        Value::Object(map) => map.get("key").is_some_and(|key| !key.is_null()),
        _ => false,
    }
}

fn field_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, RpcError> {
    value[field]
        .as_str()
        .ok_or_else(|| RpcError::malformed(format!("missing string field {field:?}")))
}

/// Text of a reply that is a bare JSON string or number.
fn scalar_text(reply: &Value, what: &str) -> Result<String, RpcError> {
    match reply {
        Value::String(text) => Ok(text.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(RpcError::malformed(format!("{what} reply is not a scalar: {other}"))),
    }
}

fn parse_counter(reply: &Value) -> Result<u64, RpcError> {
    let text = scalar_text(reply, "counter")?;
    text.parse()
        .map_err(|_| RpcError::malformed(format!("counter is not an integer: {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_key_shapes() {
        assert!(manager_key_revealed(&json!("edpkuAasC4JJhAP8r6uLt4hrXojaUrwp4Eq5WeazGHXcaCVvtR9Y6Q")));
        assert!(manager_key_revealed(&json!({ "manager": "tz1", "key": "edpk" })));
        assert!(!manager_key_revealed(&json!({ "manager": "tz1" })));
        assert!(!manager_key_revealed(&json!({ "manager": "tz1", "key": null })));
        assert!(!manager_key_revealed(&Value::Null));
    }

    #[test]
    fn counter_accepts_string_or_number() {
        assert_eq!(parse_counter(&json!("41")).unwrap(), 41);
        assert_eq!(parse_counter(&json!(41)).unwrap(), 41);
        assert!(parse_counter(&json!("-1")).is_err());
        assert!(parse_counter(&Value::Null).is_err());
    }

    #[test]
    fn field_str_reports_missing_field() {
        match field_str(&json!({}), "hash") {
            Err(RpcError::MalformedResponse(msg)) => assert!(msg.contains("hash")),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn submission_accessors() {
        let submission = Submission {
            results: Vec::new(),
            operation_hash: None,
        };
        assert!(!submission.injected());
        assert!(submission.last().is_none());
    }
}
