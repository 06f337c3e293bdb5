use crate::error::Result;
use reqwest::{Client, ClientBuilder};

const ENV_SCHEME: &str = "TRELLO_SCHEME";
const ENV_HOST: &str = "TRELLO_HOST";

/// Create the default HTTP client for API requests.
///
/// Only pooling is tuned; timeouts stay at the client defaults.
pub fn create_rest_client() -> Result<Client> {
    let client = ClientBuilder::new().pool_max_idle_per_host(50).build()?;
    Ok(client)
}

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL scheme (http or https)
    pub scheme: String,
    /// API host
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scheme: "https".to_string(),
            host: "api.trello.com".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with the given scheme and host
    pub fn new(scheme: String, host: String) -> Self {
        Config { scheme, host }
    }

    /// Read `TRELLO_SCHEME` and `TRELLO_HOST`, keeping defaults for unset ones
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            scheme: std::env::var(ENV_SCHEME).unwrap_or(defaults.scheme),
            host: std::env::var(ENV_HOST).unwrap_or(defaults.host),
        }
    }

    /// Get the base URL substituted for `{{BaseURL}}`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}
