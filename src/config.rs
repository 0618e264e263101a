use std::env;

pub const DEFAULT_STABILITY_URL: &str =
    "https://api.stability.ai/v2beta/stable-image/generate/core";
pub const GREENFIELD_TESTNET_CHAIN_ID: u64 = 5600;
pub const GREENFIELD_TESTNET_RPC: &str = "https://gnfd-testnet-fullnode-tendermint-ap.bnbchain.org";
pub const DEFAULT_BUCKET_NAME: &str = "ai-socia-demo";
pub const DEFAULT_GAS_PRICE: &str = "5000000000";

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            api_key: None,
            endpoint: DEFAULT_STABILITY_URL.to_string(),
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("STABILITY_API_KEY").ok().filter(|k| !k.is_empty());
        let endpoint =
            env::var("STABILITY_API_URL").unwrap_or_else(|_| DEFAULT_STABILITY_URL.to_string());

        StabilityConfig { api_key, endpoint }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Native currency of a chain as shown by wallets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Chain registration handed to the wallet layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    pub network: String,
    pub native_currency: NativeCurrency,
    pub rpc_url: String,
    pub testnet: bool,
}

impl ChainDescriptor {
    pub fn greenfield_testnet() -> Self {
        ChainDescriptor {
            id: GREENFIELD_TESTNET_CHAIN_ID,
            name: "Greenfield Testnet".to_string(),
            network: "greenfield-testnet".to_string(),
            native_currency: NativeCurrency {
                name: "BNB".to_string(),
                symbol: "tBNB".to_string(),
                decimals: 18,
            },
            rpc_url: GREENFIELD_TESTNET_RPC.to_string(),
            testnet: true,
        }
    }
}

/// Storage network settings. Built once at startup and shared read-only
/// with every upload run.
#[derive(Debug, Clone)]
pub struct GreenfieldConfig {
    pub chain: ChainDescriptor,
    pub bucket_name: String,
    pub denom: String,
    pub fallback_gas_price: String,
    /// Origin the off-chain auth credential is bound to.
    pub domain: String,
}

impl Default for GreenfieldConfig {
    fn default() -> Self {
        GreenfieldConfig {
            chain: ChainDescriptor::greenfield_testnet(),
            bucket_name: DEFAULT_BUCKET_NAME.to_string(),
            denom: "BNB".to_string(),
            fallback_gas_price: DEFAULT_GAS_PRICE.to_string(),
            domain: "http://localhost:3000".to_string(),
        }
    }
}

impl GreenfieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = bucket_name.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_chain(mut self, chain: ChainDescriptor) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.chain.rpc_url = rpc_url.into();
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain.id
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub stability: StabilityConfig,
    pub greenfield: GreenfieldConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: None,
            stability: StabilityConfig::default(),
            greenfield: GreenfieldConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            host,
            port,
            stability: StabilityConfig::from_env(),
            greenfield: GreenfieldConfig::default(),
        }
    }

    pub fn with_stability(mut self, config: StabilityConfig) -> Self {
        self.stability = config;
        self
    }

    pub fn with_greenfield(mut self, config: GreenfieldConfig) -> Self {
        self.greenfield = config;
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(3000)
    }
}
