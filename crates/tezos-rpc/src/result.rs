//! Per-kind parsing of preapply outcomes.
//!
//! The node answers preapply with one entry per submitted record. Each entry
//! is routed by its `kind` to a parser registered in [`ResultHandlers`]; new
//! kinds are added with [`ResultHandlers::register`] without touching the
//! dispatch.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::RpcError;
use crate::operation::kind;

const APPLIED: &str = "applied";

/// Parsed outcome of one operation record.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    /// The node's entry for this record, untouched.
    pub raw: Value,
    pub succeeded: bool,
    pub details: ResultDetails,
}

/// Kind-specific fields of an [`OperationResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResultDetails {
    Activation {
        /// First balance update, in micro-tez.
        change: Option<i64>,
    },
    Transaction {
        status: String,
        consumed_gas: String,
    },
    Reveal {
        status: String,
    },
    /// Produced by handlers registered outside this crate.
    Other,
}

/// Turns one preapply entry into a result.
pub type ResultParser = fn(&Value) -> OperationResult;

/// Registry of result parsers keyed by operation kind.
#[derive(Debug, Clone)]
pub struct ResultHandlers {
    parsers: HashMap<String, ResultParser>,
}

impl Default for ResultHandlers {
    fn default() -> Self {
        let mut handlers = Self::empty();
        handlers.register(kind::ACTIVATE_ACCOUNT, parse_activation);
        handlers.register(kind::TRANSACTION, parse_transaction);
        handlers.register(kind::REVEAL, parse_reveal);
        handlers
    }
}

impl ResultHandlers {
    /// A registry with no parsers.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Add or replace the parser for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, parser: ResultParser) {
        self.parsers.insert(kind.into(), parser);
    }

    pub fn handles(&self, kind: &str) -> bool {
        self.parsers.contains_key(kind)
    }

    /// Parse a preapply reply into one result per record, in order.
    ///
    /// Entries with a blank or missing `kind` are skipped. A kind with no
    /// registered parser fails the whole reply.
    pub fn parse_preapply(&self, response: &Value) -> Result<Vec<OperationResult>, RpcError> {
        let groups = response
            .as_array()
            .ok_or_else(|| RpcError::malformed("preapply reply is not an array"))?;

        let Some(first) = groups.first() else {
            return Ok(Vec::new());
        };

        let contents = first["contents"]
            .as_array()
            .ok_or_else(|| RpcError::malformed("preapply reply has no contents array"))?;

        let mut results = Vec::with_capacity(contents.len());
        for content in contents {
            let kind = match content["kind"].as_str() {
                Some(kind) if !kind.trim().is_empty() => kind,
                _ => continue,
            };
            let parser = self
                .parsers
                .get(kind)
                .ok_or_else(|| RpcError::UnsupportedOperationKind(kind.to_string()))?;
            results.push(parser(content));
        }

        Ok(results)
    }
}

/// `activate_account`: succeeds iff the first balance update carries a change.
pub fn parse_activation(raw: &Value) -> OperationResult {
    let change = match &raw["metadata"]["balance_updates"][0]["change"] {
        Value::String(text) => text.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };

    OperationResult {
        raw: raw.clone(),
        succeeded: change.is_some(),
        details: ResultDetails::Activation { change },
    }
}

/// `transaction`: succeeds iff the operation result status is `applied`.
pub fn parse_transaction(raw: &Value) -> OperationResult {
    let op_result = &raw["metadata"]["operation_result"];
    let status = status_of(op_result);
    let consumed_gas = match &op_result["consumed_gas"] {
        Value::String(text) => text.clone(),
        Value::Number(n) => n.to_string(),
        _ => "0".to_string(),
    };

    OperationResult {
        raw: raw.clone(),
        succeeded: status == APPLIED,
        details: ResultDetails::Transaction {
            status,
            consumed_gas,
        },
    }
}

/// `reveal`: same success rule as transactions.
pub fn parse_reveal(raw: &Value) -> OperationResult {
    let status = status_of(&raw["metadata"]["operation_result"]);

    OperationResult {
        raw: raw.clone(),
        succeeded: status == APPLIED,
        details: ResultDetails::Reveal { status },
    }
}

fn status_of(op_result: &Value) -> String {
    op_result["status"].as_str().unwrap_or("unknown").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn preapply(contents: Value) -> Value {
        json!([{ "contents": contents, "signature": "edsig" }])
    }

    #[test]
    fn transaction_applied() {
        let reply = preapply(json!([{
            "kind": "transaction",
            "metadata": { "operation_result": { "status": "applied", "consumed_gas": "10100" } }
        }]));

        let results = ResultHandlers::default().parse_preapply(&reply).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].succeeded);
        assert_eq!(
            results[0].details,
            ResultDetails::Transaction {
                status: "applied".into(),
                consumed_gas: "10100".into()
            }
        );
    }

    #[test]
    fn transaction_failed_or_missing_metadata() {
        let reply = preapply(json!([
            { "kind": "transaction", "metadata": { "operation_result": { "status": "failed" } } },
            { "kind": "transaction" }
        ]));

        let results = ResultHandlers::default().parse_preapply(&reply).unwrap();
        assert!(!results[0].succeeded);
        assert_eq!(
            results[1].details,
            ResultDetails::Transaction {
                status: "unknown".into(),
                consumed_gas: "0".into()
            }
        );
        assert!(!results[1].succeeded);
    }

    #[test]
    fn activation_reads_first_balance_update() {
        let reply = preapply(json!([{
            "kind": "activate_account",
            "metadata": { "balance_updates": [
                { "kind": "contract", "change": "2500000000" },
                { "kind": "contract", "change": "-1" }
            ] }
        }]));

        let results = ResultHandlers::default().parse_preapply(&reply).unwrap();
        assert!(results[0].succeeded);
        assert_eq!(
            results[0].details,
            ResultDetails::Activation { change: Some(2_500_000_000) }
        );
    }

    #[test]
    fn activation_without_balance_updates_fails() {
        let result = parse_activation(&json!({ "kind": "activate_account", "metadata": {} }));
        assert!(!result.succeeded);
        assert_eq!(result.details, ResultDetails::Activation { change: None });
    }

    #[test]
    fn reveal_is_parsed() {
        let result = parse_reveal(&json!({
            "kind": "reveal",
            "metadata": { "operation_result": { "status": "applied" } }
        }));
        assert!(result.succeeded);
    }

    #[test]
    fn blank_and_missing_kinds_are_skipped() {
        let reply = preapply(json!([
            { "kind": "" },
            { "no_kind": true },
            { "kind": "reveal", "metadata": { "operation_result": { "status": "applied" } } }
        ]));

        let results = ResultHandlers::default().parse_preapply(&reply).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let reply = preapply(json!([{ "kind": "delegation" }]));
        match ResultHandlers::default().parse_preapply(&reply) {
            Err(RpcError::UnsupportedOperationKind(kind)) => assert_eq!(kind, "delegation"),
            other => panic!("expected UnsupportedOperationKind, got {:?}", other),
        }
    }

    #[test]
    fn registry_is_extensible() {
        fn parse_delegation(raw: &Value) -> OperationResult {
            OperationResult {
                raw: raw.clone(),
                succeeded: true,
                details: ResultDetails::Other,
            }
        }

        let mut handlers = ResultHandlers::default();
        assert!(!handlers.handles("delegation"));
        handlers.register("delegation", parse_delegation);

        let results = handlers
            .parse_preapply(&preapply(json!([{ "kind": "delegation" }])))
            .unwrap();
        assert_eq!(results[0].details, ResultDetails::Other);
    }

    #[test]
    fn empty_reply_yields_no_results() {
        assert!(ResultHandlers::default().parse_preapply(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn non_array_reply_is_malformed() {
        assert!(matches!(
            ResultHandlers::default().parse_preapply(&json!({ "contents": [] })),
            Err(RpcError::MalformedResponse(_))
        ));
        assert!(matches!(
            ResultHandlers::default().parse_preapply(&json!([{}])),
            Err(RpcError::MalformedResponse(_))
        ));
    }
}
