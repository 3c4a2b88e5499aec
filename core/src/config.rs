//! Transport configuration.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const TIMEOUT_ENV: &str = "WAITER_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "WAITER_USER_AGENT";

/// Settings for [`UreqTransport`](crate::transport::UreqTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Overall timeout per request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Headers added to every request, before the chef's own headers.
    pub default_headers: Vec<(String, String)>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: format!("waiter/{}", env!("CARGO_PKG_VERSION")),
            default_headers: Vec::new(),
        }
    }
}

impl TransportConfig {
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Defaults overridden by `WAITER_TIMEOUT_SECS` and `WAITER_USER_AGENT`.
    ///
    /// A timeout of `0` disables the timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(agent) = lookup(USER_AGENT_ENV) {
            if agent.trim().is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: USER_AGENT_ENV,
                    value: agent,
                });
            }
            config.user_agent = agent;
        }
        Ok(config)
    }
}

#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> TransportConfig {
        self.config
    }
}
