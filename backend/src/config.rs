use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, time::Duration};

use crate::utils::{cookies::SameSite, time::parse_ttl_seconds};

const MIN_PRODUCTION_SECRET_LEN: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub production_mode: bool,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_connect_timeout_secs: u64,
    pub jwt_access_secret: String,
    pub jwt_refresh_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_access_ttl: u64,
    /// Refresh token lifetime in seconds; also the refresh cookie Max-Age.
    pub jwt_refresh_ttl: u64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub cors_allow_origins: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production_mode = match app_env.trim().to_ascii_lowercase().as_str() {
            "production" => true,
            "development" | "test" => false,
            other => bail!("Invalid APP_ENV value: {}", other),
        };

        let bind_addr_raw = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr: SocketAddr = bind_addr_raw
            .parse()
            .map_err(|_| anyhow!("Invalid BIND_ADDR value: {}", bind_addr_raw))?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost:5432/budget_buddy".to_string());
        let database_connect_timeout_secs = parse_env_number("DATABASE_CONNECT_TIMEOUT_SECS", 10)?;

        let jwt_access_secret = secret_from_env("JWT_ACCESS_SECRET", "dev_access_secret", production_mode)?;
        let jwt_refresh_secret =
            secret_from_env("JWT_REFRESH_SECRET", "dev_refresh_secret", production_mode)?;

        let jwt_access_ttl =
            parse_ttl_seconds(&env::var("JWT_ACCESS_TTL").unwrap_or_else(|_| "15m".to_string()));
        let jwt_refresh_ttl =
            parse_ttl_seconds(&env::var("JWT_REFRESH_TTL").unwrap_or_else(|_| "7d".to_string()));

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| anyhow!("Invalid COOKIE_SECURE value: {}", raw))?,
            Err(_) => production_mode,
        };
        let cookie_same_site = match env::var("COOKIE_SAME_SITE") {
            Ok(raw) => raw
                .parse::<SameSite>()
                .map_err(|_| anyhow!("Invalid COOKIE_SAME_SITE value: {}", raw))?,
            Err(_) => SameSite::Lax,
        };

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let rate_limit_per_minute = parse_env_number("RATE_LIMIT_PER_MINUTE", 60)?;
        let password_hash_memory_kib = parse_env_number(
            "PASSWORD_HASH_MEMORY_KIB",
            argon2::Params::DEFAULT_M_COST,
        )?;
        let password_hash_iterations =
            parse_env_number("PASSWORD_HASH_ITERATIONS", argon2::Params::DEFAULT_T_COST)?;

        Ok(Config {
            production_mode,
            bind_addr,
            database_url,
            database_connect_timeout_secs,
            jwt_access_secret,
            jwt_refresh_secret,
            jwt_access_ttl,
            jwt_refresh_ttl,
            cookie_secure,
            cookie_same_site,
            cors_allow_origins,
            rate_limit_per_minute,
            password_hash_memory_kib,
            password_hash_iterations,
        })
    }

    pub fn database_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.database_connect_timeout_secs.max(1))
    }

    pub fn refresh_cookie_max_age(&self) -> Duration {
        Duration::from_secs(self.jwt_refresh_ttl)
    }
}

fn secret_from_env(name: &str, dev_default: &str, production_mode: bool) -> anyhow::Result<String> {
    let value = env::var(name).unwrap_or_default();
    if production_mode {
        if value.len() < MIN_PRODUCTION_SECRET_LEN {
            bail!(
                "{} must be set to at least {} characters in production",
                name,
                MIN_PRODUCTION_SECRET_LEN
            );
        }
        return Ok(value);
    }
    if value.is_empty() {
        Ok(dev_default.to_string())
    } else {
        Ok(value)
    }
}

fn parse_env_number<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nope"), None);
    }

    #[test]
    fn secret_from_env_rejects_short_production_secret() {
        // The variable is never set in the test environment.
        let err = secret_from_env("BUDGET_BUDDY_TEST_UNSET_SECRET", "dev", true)
            .expect_err("missing production secret should fail");
        assert!(err.to_string().contains("at least 16 characters"));
    }

    #[test]
    fn secret_from_env_falls_back_in_development() {
        let secret = secret_from_env("BUDGET_BUDDY_TEST_UNSET_SECRET", "dev_access_secret", false)
            .expect("dev default");
        assert_eq!(secret, "dev_access_secret");
    }

    #[test]
    fn parse_env_number_uses_default_when_unset() {
        let value: u32 = parse_env_number("BUDGET_BUDDY_TEST_UNSET_NUMBER", 42).expect("default");
        assert_eq!(value, 42);
    }
}
