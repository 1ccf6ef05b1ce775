//! Fixed identity provider used by tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{IdentityProvider, SessionToken, UserId};

#[derive(Debug, Default)]
pub struct StaticIdentity {
    sessions: HashMap<String, UserId>,
    unavailable: Mutex<bool>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: &str, user: &str) -> Self {
        self.sessions
            .insert(token.to_string(), UserId(user.to_string()));
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn verify(&self, token: &SessionToken) -> Result<Option<UserId>> {
        if *self.unavailable.lock().unwrap() {
            bail!("simulated identity provider outage");
        }
        Ok(self.sessions.get(token.as_str()).cloned())
    }
}
