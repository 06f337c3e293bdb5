use crate::client::{create_rest_client, Config};
use crate::credentials::{CredentialSource, Credentials};
use crate::endpoint::substitute;
use crate::error::Result;
use crate::resolve::CustomFieldCache;
use crate::transport::{HttpTransport, RestResponse, Transport};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Context shared by every card operation.
///
/// Cloning is cheap; clones share the transport and the custom-field
/// lookup cache.
#[derive(Clone)]
pub struct RestContext {
    /// Configuration
    pub config: Config,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    field_cache: Arc<CustomFieldCache>,
}

impl RestContext {
    /// Create a context talking HTTP to the default API host
    pub fn new(credentials: Credentials) -> Result<Self> {
        let transport = HttpTransport::new(create_rest_client()?);
        Ok(Self::with_transport(credentials, Arc::new(transport)))
    }

    /// Create a context with credentials taken from `source`
    pub fn from_source(source: &dyn CredentialSource) -> Result<Self> {
        Self::new(source.credentials()?)
    }

    /// Create a context over any transport
    pub fn with_transport(credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        RestContext {
            config: Config::default(),
            credentials,
            transport,
            field_cache: Arc::new(CustomFieldCache::new()),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Share an existing custom-field lookup cache
    pub fn with_field_cache(mut self, cache: Arc<CustomFieldCache>) -> Self {
        self.field_cache = cache;
        self
    }

    pub fn field_cache(&self) -> &CustomFieldCache {
        &self.field_cache
    }

    /// Apply base substitution plus any scope tokens to a template
    pub fn endpoint(&self, template: &str, extra: &[(&str, &str)]) -> String {
        let base_url = self.config.base_url();
        let mut values: Vec<(&str, &str)> = vec![
            ("BaseURL", base_url.as_str()),
            ("key", self.credentials.key.as_str()),
            ("token", self.credentials.token.as_str()),
        ];
        values.extend_from_slice(extra);
        substitute(template, &values)
    }

    /// Execute one request through the transport
    pub async fn send(&self, url: &str, method: Method, body: Option<&Value>) -> Result<RestResponse> {
        self.transport.request(url, method, body).await
    }
}

impl std::fmt::Debug for RestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestContext")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
