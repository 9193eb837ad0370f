use dotenvy::dotenv;

use stack_interacts_core::config::{parse_address_policy, InteractsConfig, StacksNetwork};
use stack_interacts_core::InteractsError;

pub const STACKS_NETWORK_KEY: &str = "STACKS_NETWORK";
pub const STACKS_API_URL_KEY: &str = "STACKS_API_URL";
pub const INTERACTS_DEPLOYER_KEY: &str = "INTERACTS_DEPLOYER";
pub const INTERACTS_ADDRESS_POLICY_KEY: &str = "INTERACTS_ADDRESS_POLICY";
pub const STACKS_ADDRESS_KEY: &str = "STACKS_ADDRESS";

pub fn get_env_var(key: &str) -> Option<String> {
    dotenv().ok();
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Environment overrides for the config file. Unset variables leave the
/// configured value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractsEnv {
    pub network: Option<String>,
    pub api_url: Option<String>,
    pub deployer: Option<String>,
    pub address_policy: Option<String>,
    pub address: Option<String>,
}

impl InteractsEnv {
    pub fn load() -> Self {
        Self::from_lookup(get_env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            network: lookup(STACKS_NETWORK_KEY),
            api_url: lookup(STACKS_API_URL_KEY),
            deployer: lookup(INTERACTS_DEPLOYER_KEY),
            address_policy: lookup(INTERACTS_ADDRESS_POLICY_KEY),
            address: lookup(STACKS_ADDRESS_KEY),
        }
    }

    pub fn apply(&self, mut config: InteractsConfig) -> Result<InteractsConfig, InteractsError> {
        if let Some(ref network) = self.network {
            config.network = network.parse::<StacksNetwork>()?;
        }
        if let Some(ref api_url) = self.api_url {
            config.api_url = Some(api_url.clone());
        }
        if let Some(ref deployer) = self.deployer {
            config.contracts.deployer = deployer.clone();
        }
        if let Some(ref policy) = self.address_policy {
            config.address_policy = parse_address_policy(policy)?;
        }
        if let Some(ref address) = self.address {
            config.sender = Some(address.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_interacts_core::validation::AddressPolicy;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> InteractsEnv {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        InteractsEnv::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_env_keeps_config() {
        let config = InteractsConfig::default();
        assert_eq!(env(&[]).apply(config.clone()).unwrap(), config);
    }

    #[test]
    fn test_env_overrides_config() {
        let config = env(&[
            (STACKS_NETWORK_KEY, "testnet"),
            (INTERACTS_DEPLOYER_KEY, "ST000000000000000000002AMW42H"),
            (INTERACTS_ADDRESS_POLICY_KEY, "c32check"),
            (STACKS_ADDRESS_KEY, "ST000000000000000000002AMW42H"),
        ])
        .apply(InteractsConfig::default())
        .unwrap();
        assert_eq!(config.network, StacksNetwork::Testnet);
        assert_eq!(config.api_url(), "https://api.testnet.hiro.so");
        assert_eq!(config.contracts.deployer, "ST000000000000000000002AMW42H");
        assert_eq!(config.address_policy, AddressPolicy::C32Check);
        assert_eq!(config.sender.as_deref(), Some("ST000000000000000000002AMW42H"));
    }

    #[test]
    fn test_api_url_wins_over_network_default() {
        let config = env(&[(STACKS_NETWORK_KEY, "devnet"), (STACKS_API_URL_KEY, "http://node:3999")])
            .apply(InteractsConfig::default())
            .unwrap();
        assert_eq!(config.api_url(), "http://node:3999");
    }

    #[test]
    fn test_invalid_network_is_rejected() {
        let result = env(&[(STACKS_NETWORK_KEY, "regtest")]).apply(InteractsConfig::default());
        assert!(matches!(result, Err(InteractsError::Config(_))));
    }
}
