use std::env;
use std::fmt;
use std::time::Duration;

use backend::{HttpBackend, csrf_token_from_cookies};
use exam_core::Clock;
use url::Url;

use crate::error::ConfigError;
use crate::provisioner::DEFAULT_PROVISION_TIMEOUT;
use crate::timer::DEFAULT_TICK;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(30);

/// Runtime knobs of one exam session.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub clock: Clock,
    pub provision_timeout: Duration,
    pub snapshot_interval: Duration,
    pub timer_tick: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            clock: Clock::system(),
            provision_timeout: DEFAULT_PROVISION_TIMEOUT,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            timer_tick: DEFAULT_TICK,
        }
    }
}

/// Backend location plus session settings, usually read from the environment.
#[derive(Clone)]
pub struct ExamConfig {
    pub base_url: Url,
    /// Raw `Cookie`-style header the CSRF token is read from.
    pub cookie: Option<String>,
    pub request_timeout: Duration,
    pub provision_timeout: Duration,
    pub snapshot_interval: Duration,
    pub timer_tick: Duration,
}

// The cookie carries the CSRF token; keep it out of logs.
impl fmt::Debug for ExamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamConfig")
            .field("base_url", &self.base_url.as_str())
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("provision_timeout", &self.provision_timeout)
            .field("snapshot_interval", &self.snapshot_interval)
            .field("timer_tick", &self.timer_tick)
            .finish()
    }
}

impl ExamConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            cookie: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            provision_timeout: DEFAULT_PROVISION_TIMEOUT,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            timer_tick: DEFAULT_TICK,
        })
    }

    /// Reads `EXAM_BASE_URL`, `EXAM_COOKIE`, `EXAM_REQUEST_TIMEOUT_SECS` and
    /// `EXAM_SNAPSHOT_INTERVAL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an invalid URL or a non-positive number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like `from_env`, reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an invalid URL or a non-positive number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("EXAM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let mut config = Self::new(&base_url)?;
        config.cookie = lookup("EXAM_COOKIE").filter(|value| !value.trim().is_empty());
        if let Some(raw) = lookup("EXAM_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_seconds("EXAM_REQUEST_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("EXAM_SNAPSHOT_INTERVAL_SECS") {
            config.snapshot_interval = parse_seconds("EXAM_SNAPSHOT_INTERVAL_SECS", &raw)?;
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        self.cookie.as_deref().and_then(csrf_token_from_cookies)
    }

    #[must_use]
    pub fn settings(&self, clock: Clock) -> SessionSettings {
        SessionSettings {
            clock,
            provision_timeout: self.provision_timeout,
            snapshot_interval: self.snapshot_interval,
            timer_tick: self.timer_tick,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Backend` if the HTTP client cannot be built.
    pub fn http_backend(&self) -> Result<HttpBackend, ConfigError> {
        let backend = HttpBackend::new(
            self.base_url.clone(),
            self.csrf_token(),
            self.request_timeout,
        )?;
        Ok(backend)
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::BaseUrl {
        value: value.to_owned(),
        source,
    })
}

fn parse_seconds(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Seconds {
            key,
            value: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = ExamConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.snapshot_interval, Duration::from_secs(30));
        assert_eq!(config.csrf_token(), None);
    }

    #[test]
    fn reads_cookie_and_intervals() {
        let config = ExamConfig::from_lookup(lookup(&[
            ("EXAM_BASE_URL", "https://exam.example.org/portal"),
            ("EXAM_COOKIE", "sessionid=1; csrftoken=abc%3D"),
            ("EXAM_SNAPSHOT_INTERVAL_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.csrf_token().as_deref(), Some("abc="));
        assert_eq!(config.snapshot_interval, Duration::from_secs(5));
        assert!(!format!("{config:?}").contains("abc"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ExamConfig::from_lookup(lookup(&[("EXAM_BASE_URL", "not a url")])),
            Err(ConfigError::BaseUrl { .. })
        ));
        assert!(matches!(
            ExamConfig::from_lookup(lookup(&[("EXAM_REQUEST_TIMEOUT_SECS", "0")])),
            Err(ConfigError::Seconds {
                key: "EXAM_REQUEST_TIMEOUT_SECS",
                ..
            })
        ));
    }
}
