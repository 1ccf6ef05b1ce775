//! Hosted identity provider
//!
//! An authenticated session yields a stable user identifier. The tool never
//! issues sessions itself; the operator signs in with the provider and hands
//! the session token to `auth login`.

pub mod client;
#[cfg(test)]
pub mod memory;

pub use client::IdentityClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session token issued by the identity provider
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens never end up in logs
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(***)")
    }
}

/// Stable identifier of an authenticated operator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves session tokens to users
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The user behind `token`, or `None` if the session is not valid
    async fn verify(&self, token: &SessionToken) -> Result<Option<UserId>>;
}
