use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl FromStr for SameSite {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

impl From<&Config> for CookieOptions {
    fn from(config: &Config) -> Self {
        Self {
            secure: config.cookie_secure,
            same_site: config.cookie_same_site,
        }
    }
}

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
/// The refresh cookie is only sent to the auth endpoints.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

pub fn build_auth_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    path: &str,
    options: CookieOptions,
) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        name,
        value,
        path,
        max_age.as_secs(),
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_cookie(name: &str, path: &str, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite={}",
        name,
        path,
        same_site_value(options.same_site)
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_refresh_cookie(token: &str, config: &Config) -> String {
    build_auth_cookie(
        REFRESH_COOKIE_NAME,
        token,
        config.refresh_cookie_max_age(),
        REFRESH_COOKIE_PATH,
        CookieOptions::from(config),
    )
}

pub fn clear_refresh_cookie(config: &Config) -> String {
    build_clear_cookie(
        REFRESH_COOKIE_NAME,
        REFRESH_COOKIE_PATH,
        CookieOptions::from(config),
    )
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
