//! Operation records, micro-tez amounts and batch assembly.
//!
//! Records serialize to the node's JSON shape: tagged by `kind`, with every
//! numeric field (counter, fee, limits, amount) as a decimal string.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::RpcError;

/// Operation kind tags, as they appear in `kind` fields.
pub mod kind {
    pub const ACTIVATE_ACCOUNT: &str = "activate_account";
    pub const REVEAL: &str = "reveal";
    pub const TRANSACTION: &str = "transaction";
}

pub const DEFAULT_GAS_LIMIT: u64 = 200;
pub const DEFAULT_STORAGE_LIMIT: u64 = 0;

const MICRO_PER_TEZ: u64 = 1_000_000;
const TEZ_DECIMALS: usize = 6;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// An amount in micro-tez (10^-6 tez), the unit used on the wire.
///
/// Parsing from tez text is exact: the input is read as a decimal, rounded to
/// 6 fractional digits half away from zero, and never goes through binary
/// floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MicroTez(u64);

impl MicroTez {
    pub const ZERO: MicroTez = MicroTez(0);

    pub const fn from_micro(micro: u64) -> Self {
        Self(micro)
    }

    pub const fn as_micro(self) -> u64 {
        self.0
    }

    /// Parse an integer micro-tez string, as returned by balance queries.
    pub fn from_micro_str(text: &str) -> Result<Self, RpcError> {
        text.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| RpcError::InvalidAmount(format!("{text:?}: {e}")))
    }

    /// Render as tez text with trailing fractional zeros removed.
    pub fn to_tez_string(self) -> String {
        let whole = self.0 / MICRO_PER_TEZ;
        let frac = self.0 % MICRO_PER_TEZ;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:06}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl FromStr for MicroTez {
    type Err = RpcError;

    /// Parse tez text such as `"1"`, `"0.5"` or `"12.3456789"`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| RpcError::InvalidAmount(format!("{text:?}: {why}"));

        let trimmed = text.trim();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if unsigned.starts_with('-') {
            return Err(invalid("negative amounts are not allowed"));
        }

        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a decimal number"));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("out of range"))?
        };

        let kept = &frac[..frac.len().min(TEZ_DECIMALS)];
        let mut micro_frac: u64 = format!("{kept:0<width$}", width = TEZ_DECIMALS)
            .parse()
            .map_err(|_| invalid("not a decimal number"))?;

        // Half away from zero: only the first dropped digit decides.
        if frac.as_bytes().get(TEZ_DECIMALS).is_some_and(|&d| d >= b'5') {
            micro_frac += 1;
        }

        whole
            .checked_mul(MICRO_PER_TEZ)
            .and_then(|m| m.checked_add(micro_frac))
            .map(Self)
            .ok_or_else(|| invalid("out of range"))
    }
}

/// The wire form: an integer micro-tez count.
impl fmt::Display for MicroTez {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MicroTez {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn as_decimal_string<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Gas and storage caps attached to manager operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationLimits {
    pub gas_limit: u64,
    pub storage_limit: u64,
}

impl Default for OperationLimits {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            storage_limit: DEFAULT_STORAGE_LIMIT,
        }
    }
}

/// One operation record of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    ActivateAccount {
        pkh: String,
        secret: String,
    },
    Reveal {
        source: String,
        fee: MicroTez,
        #[serde(serialize_with = "as_decimal_string")]
        counter: u64,
        #[serde(serialize_with = "as_decimal_string")]
        gas_limit: u64,
        #[serde(serialize_with = "as_decimal_string")]
        storage_limit: u64,
        public_key: String,
    },
    Transaction {
        source: String,
        fee: MicroTez,
        #[serde(serialize_with = "as_decimal_string")]
        counter: u64,
        #[serde(serialize_with = "as_decimal_string")]
        gas_limit: u64,
        #[serde(serialize_with = "as_decimal_string")]
        storage_limit: u64,
        amount: MicroTez,
        destination: String,
        parameters: Value,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::ActivateAccount { .. } => kind::ACTIVATE_ACCOUNT,
            Operation::Reveal { .. } => kind::REVEAL,
            Operation::Transaction { .. } => kind::TRANSACTION,
        }
    }

    /// Counter of a manager operation; activations have none.
    pub fn counter(&self) -> Option<u64> {
        match self {
            Operation::ActivateAccount { .. } => None,
            Operation::Reveal { counter, .. } | Operation::Transaction { counter, .. } => {
                Some(*counter)
            }
        }
    }

    fn counter_mut(&mut self) -> Option<&mut u64> {
        match self {
            Operation::ActivateAccount { .. } => None,
            Operation::Reveal { counter, .. } | Operation::Transaction { counter, .. } => {
                Some(counter)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// Ordered records submitted as one atomic unit.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationBatch {
    operations: Vec<Operation>,
}

impl OperationBatch {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The `contents` array sent to forge and preapply.
    pub fn contents(&self) -> Result<Value, RpcError> {
        Ok(serde_json::to_value(&self.operations)?)
    }
}

/// Assembles an [`OperationBatch`].
///
/// Counters are assigned by [`BatchBuilder::build`], starting at the
/// account's current counter plus one. A reveal always takes the first slot,
/// whenever it was added; the other records keep their call order.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    reveal: Option<Operation>,
    operations: Vec<Operation>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `public_key` (an `edpk…` string) for `source`, at zero fee.
    pub fn reveal(
        mut self,
        source: impl Into<String>,
        public_key: impl Into<String>,
        limits: OperationLimits,
    ) -> Self {
        self.reveal = Some(Operation::Reveal {
            source: source.into(),
            fee: MicroTez::ZERO,
            counter: 0,
            gas_limit: limits.gas_limit,
            storage_limit: limits.storage_limit,
            public_key: public_key.into(),
        });
        self
    }

    /// Transfer `amount` to an implicit account.
    pub fn transaction(
        mut self,
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: MicroTez,
        fee: MicroTez,
        limits: OperationLimits,
    ) -> Self {
        self.operations.push(Operation::Transaction {
            source: source.into(),
            fee,
            counter: 0,
            gas_limit: limits.gas_limit,
            storage_limit: limits.storage_limit,
            amount,
            destination: destination.into(),
            parameters: json!({ "prim": "Unit", "args": [] }),
        });
        self
    }

    /// Claim a fundraiser account with its activation code.
    pub fn activation(mut self, pkh: impl Into<String>, secret: impl Into<String>) -> Self {
        self.operations.push(Operation::ActivateAccount {
            pkh: pkh.into(),
            secret: secret.into(),
        });
        self
    }

    pub fn build(self, current_counter: u64) -> Result<OperationBatch, RpcError> {
        let mut operations: Vec<Operation> = self.reveal.into_iter().chain(self.operations).collect();

        let mut next = current_counter;
        for op in &mut operations {
            if let Some(counter) = op.counter_mut() {
                next = next
                    .checked_add(1)
                    .ok_or_else(|| RpcError::malformed("account counter overflow"))?;
                *counter = next;
            }
        }

        Ok(OperationBatch { operations })
    }
}
