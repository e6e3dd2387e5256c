use failure::Fail;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "{} environment variable unset", _0)]
    Missing(&'static str),
    #[fail(display = "Invalid value for {}: {}", var, reason)]
    Invalid { var: &'static str, reason: String },
}

/// Everything the relay reads from its environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub platitude_url: Url,
    pub timeout: Duration,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn new(platitude_url: Url) -> Config {
        Config {
            platitude_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            listen_addr: ([0, 0, 0, 0], 5000).into(),
        }
    }

    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("PLATITUDE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("PLATITUDE_URL"))?;
        let platitude_url = parse_base_url(raw_url.trim())?;

        let timeout = match lookup("PLATITUDE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid {
                        var: "PLATITUDE_TIMEOUT_SECS",
                        reason: e.to_string(),
                    })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "PLATITUDE_TIMEOUT_SECS",
                        reason: "timeout must be at least one second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "LISTEN_ADDR",
                reason: e.to_string(),
            })?;

        Ok(Config {
            platitude_url,
            timeout,
            listen_addr,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var: "PLATITUDE_URL",
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            var: "PLATITUDE_URL",
            reason: format!("{} is not an http(s) base URL", raw),
        });
    }
    Ok(url)
}
