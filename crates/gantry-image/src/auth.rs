//! Registry credentials decoded from ECR authorization tokens.

use base64::Engine;
use gantry_common::error::{GantryError, Result};

/// Credentials for a container registry, ready to hand to `docker login`.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    /// Login user. ECR tokens always carry `AWS` here.
    pub username: String,
    /// Login password or session token.
    pub password: String,
    /// Registry host, without a scheme.
    pub registry: String,
}

impl RegistryAuth {
    /// Decodes an ECR authorization token into login credentials.
    ///
    /// The token is base64 over `user:password`. The proxy endpoint carries
    /// the registry host behind an `https://` scheme that `docker login`
    /// does not accept, so the scheme is stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not valid base64, not UTF-8, or is
    /// missing the `user:password` separator.
    pub fn from_authorization_token(token: &str, proxy_endpoint: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token)
            .map_err(|e| GantryError::image_build(format!("registry token is not base64: {e}")))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|e| GantryError::image_build(format!("registry token is not UTF-8: {e}")))?;
        let (username, password) = decoded.split_once(':').ok_or_else(|| {
            GantryError::image_build("registry token is missing the user:password separator")
        })?;

        let registry = proxy_endpoint
            .strip_prefix("https://")
            .unwrap_or(proxy_endpoint)
            .to_string();

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            registry,
        })
    }
}
