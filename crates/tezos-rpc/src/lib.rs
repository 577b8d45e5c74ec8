//! Tezos node RPC client and operation submission engine.
//!
//! Builds operation batches (counter sequencing, conditional reveal), runs
//! them through the node's forge, preapply and injection endpoints, and parses
//! preapply outcomes with a per-kind handler registry. The network is reached
//! through the [`Transport`] trait; [`HttpTransport`] is the `reqwest`
//! implementation.

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod result;
pub mod transport;

pub use client::{manager_key_revealed, Rpc, Submission};
pub use config::{Chain, RpcConfig};
pub use error::RpcError;
pub use operation::{BatchBuilder, MicroTez, Operation, OperationBatch, OperationLimits};
pub use result::{OperationResult, ResultDetails, ResultHandlers};
pub use transport::{HttpTransport, Transport};
