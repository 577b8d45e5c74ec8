use std::fmt;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::RpcError;

pub const DEFAULT_PROVIDER: &str = "http://localhost:8732";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Named chains understood by the node's `chains/{chain}` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Main,
    Test,
}

impl Chain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Chain::Main => "main",
            Chain::Test => "test",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.as_str().to_string()
    }
}

/// Node connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RpcConfig {
    /// Base URL of the node RPC.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// `main`, `test`, or an explicit chain id.
    #[serde(default = "default_chain")]
    pub chain: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_chain() -> String {
    Chain::Main.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            chain: default_chain(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RpcConfig {
    /// Settings for `provider` and `chain` (a [`Chain`] or any chain id
    /// string), with the default timeout.
    pub fn new(provider: impl Into<String>, chain: impl ToString) -> Result<Self, RpcError> {
        let config = Self {
            provider: provider.into(),
            chain: chain.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional `config/tezos` file, overridden by `TEZOS_*`
    /// environment variables (`TEZOS_PROVIDER`, `TEZOS_CHAIN`,
    /// `TEZOS_TIMEOUT_SECS`). Missing keys take their defaults.
    pub fn load() -> Result<Self, RpcError> {
        let config = Config::builder()
            .add_source(File::with_name("config/tezos").required(false))
            .add_source(Environment::with_prefix("TEZOS").try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    /// Deserialize and validate an already-built configuration.
    pub fn from_config(config: Config) -> Result<Self, RpcError> {
        let rpc: Self = config.try_deserialize()?;
        rpc.validate()?;
        Ok(rpc)
    }

    pub fn validate(&self) -> Result<(), RpcError> {
        if self.provider.trim().is_empty() {
            return Err(RpcError::Configuration("provider required".into()));
        }
        if self.chain.trim().is_empty() {
            return Err(RpcError::Configuration("chain required".into()));
        }
        if self.timeout_secs == 0 {
            return Err(RpcError::Configuration("timeout must be positive".into()));
        }
        Ok(())
    }

    /// Join the provider URL and `path` with exactly one `/`.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.provider.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
