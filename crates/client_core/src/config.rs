use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context};
use url::Url;

pub const DEFAULT_SERVICE_URL: &str = "https://research-paper-assistant-backend.onrender.com";
pub const DEFAULT_CONFIG_FILE: &str = "qa_client.toml";
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Client configuration, resolved once at process start.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub service_url: Url,
    /// `None` waits for the service indefinitely.
    pub request_timeout: Option<Duration>,
    pub event_capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            service_url: Url::parse(DEFAULT_SERVICE_URL).unwrap_or_else(|_| unreachable!()),
            request_timeout: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClientSettings {
    pub fn with_service_url(service_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            service_url: parse_service_url(service_url)?,
            ..Self::default()
        })
    }
}

/// Defaults, then the TOML file (`QA_CLIENT_CONFIG` or `./qa_client.toml`), then
/// environment overrides.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let config_path = std::env::var("QA_CLIENT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(&config_path) {
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("invalid client config '{}'", config_path.display()))?;
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
    Ok(settings)
}

pub(crate) fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;

    if let Some(v) = file_cfg.get("service_url") {
        let v = v
            .as_str()
            .ok_or_else(|| anyhow!("service_url must be a string"))?;
        settings.service_url = parse_service_url(v)?;
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        let secs = v
            .as_integer()
            .ok_or_else(|| anyhow!("request_timeout_secs must be an integer"))?;
        settings.request_timeout = timeout_from_secs(secs);
    }
    if let Some(v) = file_cfg.get("event_capacity") {
        let capacity = v
            .as_integer()
            .filter(|capacity| *capacity > 0)
            .ok_or_else(|| anyhow!("event_capacity must be a positive integer"))?;
        settings.event_capacity = capacity as usize;
    }

    Ok(())
}

pub(crate) fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("QA_SERVICE_URL") {
        settings.service_url = parse_service_url(&v).context("QA_SERVICE_URL")?;
    }
    if let Some(v) = lookup("APP__SERVICE_URL") {
        settings.service_url = parse_service_url(&v).context("APP__SERVICE_URL")?;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<i64>() {
            settings.request_timeout = timeout_from_secs(parsed);
        }
    }

    Ok(())
}

fn timeout_from_secs(secs: i64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs as u64))
}

/// Parses the service base address; a trailing slash is not required.
pub fn parse_service_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("service url must not be empty"));
    }
    let url = Url::parse(raw).with_context(|| format!("invalid service url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("service url '{raw}' must use http or https"));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
