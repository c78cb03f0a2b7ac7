//! Host configuration from the environment.

use anyhow::Context;
use match3_core::EngineConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Presentation delay between a committed swap and its cascade
pub const DEFAULT_RESOLVE_DELAY_MS: u64 = 300;

/// How long a game with no client attached waits to be resumed
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub resolve_delay: Duration,
    pub session_idle_ttl: Duration,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            resolve_delay: Duration::from_millis(DEFAULT_RESOLVE_DELAY_MS),
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read `SERVER_ADDR`, `RESOLVE_DELAY_MS`, `SESSION_IDLE_TTL_SECS`,
    /// `BOARD_SIZE` and `COLOR_COUNT`, falling back to defaults for unset
    /// variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let addr = parse_or(&lookup, "SERVER_ADDR", defaults.addr)?;
        let delay_ms = parse_or(&lookup, "RESOLVE_DELAY_MS", DEFAULT_RESOLVE_DELAY_MS)?;
        let idle_secs = parse_or(
            &lookup,
            "SESSION_IDLE_TTL_SECS",
            DEFAULT_SESSION_IDLE_TTL_SECS,
        )?;
        anyhow::ensure!(idle_secs > 0, "SESSION_IDLE_TTL_SECS must be positive");
        let dimension = parse_or(&lookup, "BOARD_SIZE", defaults.engine.dimension)?;
        let color_count = parse_or(&lookup, "COLOR_COUNT", defaults.engine.color_count)?;

        let engine = EngineConfig::new(dimension, color_count);
        engine.validate().context("invalid engine configuration")?;

        Ok(Self {
            addr,
            resolve_delay: Duration::from_millis(delay_ms),
            session_idle_ttl: Duration::from_secs(idle_secs),
            engine,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.resolve_delay, Duration::from_millis(300));
        assert_eq!(config.session_idle_ttl, Duration::from_secs(600));
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:9000"),
            ("RESOLVE_DELAY_MS", "50"),
            ("SESSION_IDLE_TTL_SECS", "30"),
            ("BOARD_SIZE", "10"),
            ("COLOR_COUNT", "5"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.resolve_delay, Duration::from_millis(50));
        assert_eq!(config.session_idle_ttl, Duration::from_secs(30));
        assert_eq!(config.engine.dimension, 10);
        assert_eq!(config.engine.color_count, 5);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(ServerConfig::from_lookup(lookup(&[("RESOLVE_DELAY_MS", "soon")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("COLOR_COUNT", "12")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("SESSION_IDLE_TTL_SECS", "0")])).is_err());
    }
}
