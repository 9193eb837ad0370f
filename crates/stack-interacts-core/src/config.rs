use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::constants::{DEFAULT_DEVNET_API_URL, DEFAULT_MAINNET_API_URL, DEFAULT_TESTNET_API_URL};
use crate::contracts::ContractRegistry;
use crate::errors::InteractsError;
use crate::validation::{AddressPolicy, DedupPolicy, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StacksNetwork {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
}

impl StacksNetwork {
    pub fn default_api_url(&self) -> &'static str {
        match self {
            StacksNetwork::Mainnet => DEFAULT_MAINNET_API_URL,
            StacksNetwork::Testnet => DEFAULT_TESTNET_API_URL,
            StacksNetwork::Devnet => DEFAULT_DEVNET_API_URL,
        }
    }
}

impl FromStr for StacksNetwork {
    type Err = InteractsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(StacksNetwork::Mainnet),
            "testnet" => Ok(StacksNetwork::Testnet),
            "devnet" => Ok(StacksNetwork::Devnet),
            other => Err(InteractsError::Config(format!("unknown network '{}'", other))),
        }
    }
}

impl fmt::Display for StacksNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StacksNetwork::Mainnet => write!(f, "mainnet"),
            StacksNetwork::Testnet => write!(f, "testnet"),
            StacksNetwork::Devnet => write!(f, "devnet"),
        }
    }
}

pub fn parse_address_policy(input: &str) -> Result<AddressPolicy, InteractsError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "pattern" => Ok(AddressPolicy::Pattern),
        "c32check" | "c32-check" => Ok(AddressPolicy::C32Check),
        other => Err(InteractsError::Config(format!("unknown address policy '{}'", other))),
    }
}

/// Settings shared by every command. Every field has a default, so an empty
/// file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InteractsConfig {
    pub network: StacksNetwork,
    pub api_url: Option<String>,
    pub address_policy: AddressPolicy,
    pub dedup_policy: DedupPolicy,
    /// Address used as `sender` for read-only calls and as the default stats owner.
    pub sender: Option<String>,
    pub contracts: ContractRegistry,
}

impl InteractsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, InteractsError> {
        toml::from_str(content)
            .map_err(|e| InteractsError::Config(format!("unable to parse config: {}", e)))
    }

    /// Reads a config file. A missing file yields `None`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, InteractsError> {
        if !path.exists() {
            return Ok(None);
        }
        let mut file = std::fs::File::open(path).map_err(|e| {
            InteractsError::Config(format!("unable to open {}: {}", path.display(), e))
        })?;
        let mut buf = String::new();
        file.read_to_string(&mut buf).map_err(|e| {
            InteractsError::Config(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&buf).map(Some)
    }

    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| self.network.default_api_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.address_policy, self.dedup_policy)
    }
}
