use crate::error::{BoardError, Result};

const ENV_API_KEY: &str = "TRELLO_API_KEY";
const ENV_API_TOKEN: &str = "TRELLO_API_TOKEN";

/// API key and token pair sent with every request.
///
/// Both values are opaque; no format checks are made.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub token: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Credentials {
            key: key.into(),
            token: token.into(),
        }
    }
}

// Implement Debug manually to avoid exposing the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Anything able to hand out a key and token.
pub trait CredentialSource {
    fn credentials(&self) -> Result<Credentials>;
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}

/// Reads `TRELLO_API_KEY` and `TRELLO_API_TOKEN` from the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| BoardError::Credentials(format!("{name} is not set")))
        };
        Ok(Credentials {
            key: read(ENV_API_KEY)?,
            token: read(ENV_API_TOKEN)?,
        })
    }
}
