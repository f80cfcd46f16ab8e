//! Session configuration: server address and client credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LetxbeError;

/// Production server used when no address is configured.
pub const DEFAULT_SERVER_ADDRESS: &str = "https://prod-unfold.onogone.com";

/// Environment variable overriding the server address in [`SessionConfig::from_env`].
pub const SERVER_ADDRESS_ENV: &str = "LETXBE_SERVER_ADDRESS";

/// Where a [`Session`](crate::session::Session) sends its requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    server_address: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
        }
    }
}

impl SessionConfig {
    /// Uses `address` as the server base URL. A trailing `/` is dropped.
    pub fn with_server_address(address: &str) -> Result<Self, LetxbeError> {
        url::Url::parse(address).map_err(|source| LetxbeError::InvalidServerAddress {
            input: address.to_string(),
            source,
        })?;
        Ok(Self {
            server_address: address.trim_end_matches('/').to_string(),
        })
    }

    /// Reads the address from `LETXBE_SERVER_ADDRESS`, falling back to the default.
    pub fn from_env() -> Result<Self, LetxbeError> {
        match std::env::var(SERVER_ADDRESS_ENV) {
            Ok(address) if !address.trim().is_empty() => Self::with_server_address(address.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    /// Joins a route path to the server address.
    pub(crate) fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server_address, path)
    }
}

/// Client identifier and secret exchanged for a bearer token.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_address() {
        assert_eq!(
            SessionConfig::default().server_address(),
            "https://prod-unfold.onogone.com"
        );
    }

    #[test]
    fn test_server_address_is_validated_and_trimmed() {
        let config = SessionConfig::with_server_address("http://localhost:8080/").unwrap();
        assert_eq!(config.server_address(), "http://localhost:8080");
        assert_eq!(
            config.url_for("/api/get_m2m_token"),
            "http://localhost:8080/api/get_m2m_token"
        );

        let err = SessionConfig::with_server_address("not a url").expect_err("should fail");
        assert!(matches!(err, LetxbeError::InvalidServerAddress { .. }));
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let credentials = Credentials::new("id", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("hunter2"));
    }
}
