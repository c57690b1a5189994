//! Hugging Face credential lookup

use std::fmt;

use crate::error::{EngineError, Result};

/// Access token for the model hub. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Somewhere a credential can be read from
pub trait CredentialSource {
    fn resolve(&self) -> Result<Credential>;
}

/// Reads the credential from a process environment variable
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(crate::config::CREDENTIAL_VAR)
    }
}

impl CredentialSource for EnvCredentials {
    fn resolve(&self) -> Result<Credential> {
        credential_from(&self.var, std::env::var(&self.var).ok())
    }
}

/// Fixed value, or fixed absence, standing in for the environment
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    var: String,
    value: Option<String>,
}

impl StaticCredentials {
    pub fn new(var: impl Into<String>, value: Option<String>) -> Self {
        Self {
            var: var.into(),
            value,
        }
    }

    pub fn missing(var: impl Into<String>) -> Self {
        Self::new(var, None)
    }
}

impl CredentialSource for StaticCredentials {
    fn resolve(&self) -> Result<Credential> {
        credential_from(&self.var, self.value.clone())
    }
}

fn credential_from(var: &str, value: Option<String>) -> Result<Credential> {
    match value {
        Some(token) if !token.is_empty() => Ok(Credential(token)),
        _ => Err(EngineError::configuration(
            var,
            format!(
                "Hugging Face token not found in the environment. Please set {}.",
                var
            ),
        )),
    }
}
