//! Relay configuration, read from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_GENERATION_URL: &str = "https://api.imagerouter.io";
pub const DEFAULT_MODEL: &str = "stabilityai/sdxl-turbo:free";
pub const DEFAULT_HOSTING_URL: &str = "https://api.cloudinary.com";
pub const DEFAULT_HOSTING_FOLDER: &str = "cultureverse/batik-generations";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid CULTUREVERSE_ADDR {value:?}: {reason}")]
    InvalidAddr { value: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct GenerationSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostingCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone, Debug)]
pub struct HostingSettings {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: String,
    pub folder: String,
    pub timeout: Duration,
}

impl HostingSettings {
    /// All three credentials, or `None` if any is missing.
    pub fn credentials(&self) -> Option<HostingCredentials> {
        Some(HostingCredentials {
            cloud_name: self.cloud_name.clone()?,
            api_key: self.api_key.clone()?,
            api_secret: self.api_secret.clone()?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct CardTableSettings {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub generation: GenerationSettings,
    pub hosting: HostingSettings,
    /// Remote card table. Without it cards come from the built-in catalog.
    pub cards: Option<CardTableSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| {
            let parsed = get(key).and_then(|v| v.parse::<u64>().ok());
            Duration::from_secs(parsed.filter(|&s| s > 0).unwrap_or(default))
        };

        let raw_addr = get("CULTUREVERSE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidAddr {
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        let generation = GenerationSettings {
            api_key: get("IMAGEROUTER_API_KEY"),
            base_url: get("IMAGEROUTER_URL").unwrap_or_else(|| DEFAULT_GENERATION_URL.to_string()),
            model: get("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: secs("GENERATION_TIMEOUT_SECS", 60),
        };

        let hosting = HostingSettings {
            cloud_name: get("CLOUDINARY_CLOUD_NAME"),
            api_key: get("CLOUDINARY_API_KEY"),
            api_secret: get("CLOUDINARY_API_SECRET"),
            base_url: get("CLOUDINARY_URL_BASE").unwrap_or_else(|| DEFAULT_HOSTING_URL.to_string()),
            folder: get("HOSTING_FOLDER").unwrap_or_else(|| DEFAULT_HOSTING_FOLDER.to_string()),
            timeout: secs("HOSTING_TIMEOUT_SECS", 30),
        };

        let cards = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(CardTableSettings {
                url,
                anon_key,
                timeout: secs("TABLE_TIMEOUT_SECS", 10),
            }),
            _ => None,
        };

        Ok(Self {
            addr,
            generation,
            hosting,
            cards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(cfg.generation.model, DEFAULT_MODEL);
        assert_eq!(cfg.generation.timeout, Duration::from_secs(60));
        assert_eq!(cfg.hosting.timeout, Duration::from_secs(30));
        assert_eq!(cfg.hosting.folder, DEFAULT_HOSTING_FOLDER);
        assert!(cfg.generation.api_key.is_none());
        assert!(cfg.hosting.credentials().is_none());
        assert!(cfg.cards.is_none());
    }

    #[test]
    fn hosting_needs_all_three_credentials() {
        let cfg = Config::from_lookup(lookup(&[
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "k"),
            ("CLOUDINARY_API_SECRET", " "),
        ]))
        .unwrap();
        assert!(cfg.hosting.credentials().is_none());

        let cfg = Config::from_lookup(lookup(&[
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "k"),
            ("CLOUDINARY_API_SECRET", "s"),
            ("GENERATION_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.hosting.credentials().unwrap().cloud_name, "demo");
        assert_eq!(cfg.generation.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_or_garbage_timeouts_keep_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            ("GENERATION_TIMEOUT_SECS", "0"),
            ("HOSTING_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap();
        assert_eq!(cfg.generation.timeout, Duration::from_secs(60));
        assert_eq!(cfg.hosting.timeout, Duration::from_secs(30));
    }

    #[test]
    fn bad_addr_is_an_error() {
        let err = Config::from_lookup(lookup(&[("CULTUREVERSE_ADDR", "nope")])).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
