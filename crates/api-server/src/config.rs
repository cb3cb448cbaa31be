use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Server settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Lifetime of a login session token
    pub session_ttl: chrono::Duration,
    /// Allowed CORS origins; `None` means permissive
    pub cors_origins: Option<Vec<String>>,
    /// Seed the demo accounts, patients and employees at startup
    pub seed_demo_data: bool,
    pub enable_hsts: bool,

    // Brute-force throttling
    pub auth_max_failures: u32,
    pub auth_failure_window: Duration,
    pub auth_lockout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            session_ttl: chrono::Duration::hours(24),
            cors_origins: None,
            seed_demo_data: true,
            enable_hsts: false,
            auth_max_failures: 5,
            auth_failure_window: Duration::from_secs(300),
            auth_lockout: Duration::from_secs(900),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or empty keys fall back to
    /// the defaults; malformed values are an error naming the variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_ttl_hours: i64 = parse_or(&get, "SESSION_TTL_HOURS", 24)?;
        if session_ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive, got {}", session_ttl_hours);
        }

        let cors_origins = get("CORS_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            bind_addr: parse_or(&get, "BIND_ADDR", defaults.bind_addr)?,
            port: parse_or(&get, "PORT", defaults.port)?,
            session_ttl: chrono::Duration::hours(session_ttl_hours),
            cors_origins,
            seed_demo_data: parse_flag(&get, "SEED_DEMO_DATA", defaults.seed_demo_data)?,
            enable_hsts: parse_flag(&get, "ENABLE_HSTS", defaults.enable_hsts)?,
            auth_max_failures: parse_or(&get, "AUTH_MAX_FAILURES", defaults.auth_max_failures)?,
            auth_failure_window: Duration::from_secs(parse_or(
                &get,
                "AUTH_FAILURE_WINDOW_SECS",
                defaults.auth_failure_window.as_secs(),
            )?),
            auth_lockout: Duration::from_secs(parse_or(
                &get,
                "AUTH_LOCKOUT_SECS",
                defaults.auth_lockout.as_secs(),
            )?),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("Invalid value for {}: {:?}", key, raw),
        },
        None => Ok(default),
    }
}
