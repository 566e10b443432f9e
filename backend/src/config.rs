//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `LISTINGS_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5100";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Build flavour deciding how a missing JWT secret is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode of the running binary.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Invalid or incomplete settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("LISTINGS_JWT_SECRET must be set in release builds")]
    MissingSecret,
    #[error("token lifetime must be at least one day")]
    ZeroLifetime,
    #[error("demo account needs both an email and a password")]
    PartialDemoAccount,
}

/// Read-only demo account seeded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: String,
    pub password: Zeroizing<String>,
}

/// Configuration values for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LISTINGS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Secret used to sign session tokens.
    pub jwt_secret: Option<String>,
    /// Session lifetime in days.
    #[ortho_config(default = 1)]
    pub token_lifetime_days: u64,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = false)]
    pub cookie_secure: bool,
    /// Email of the read-only demo account.
    pub demo_email: Option<String>,
    /// Password of the read-only demo account.
    pub demo_password: Option<String>,
}

impl AppSettings {
    /// Parsed listen address, falling back to `0.0.0.0:5100`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Session and cookie lifetime.
    pub fn token_lifetime(&self) -> Result<Duration, SettingsError> {
        if self.token_lifetime_days == 0 {
            return Err(SettingsError::ZeroLifetime);
        }
        Ok(Duration::from_secs(
            self.token_lifetime_days.saturating_mul(SECONDS_PER_DAY),
        ))
    }

    /// Signing secret. Debug builds fall back to a random ephemeral secret.
    pub fn jwt_secret(&self, mode: BuildMode) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        match self.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
            _ if mode == BuildMode::Debug => {
                warn!("LISTINGS_JWT_SECRET unset; using an ephemeral secret (dev only)");
                let secret: [u8; 32] = rand::random();
                Ok(Zeroizing::new(secret.to_vec()))
            }
            _ => Err(SettingsError::MissingSecret),
        }
    }

    /// Demo account credentials, when both are configured.
    pub fn demo_account(&self) -> Result<Option<DemoAccount>, SettingsError> {
        match (&self.demo_email, &self.demo_password) {
            (Some(email), Some(password)) => Ok(Some(DemoAccount {
                email: email.clone(),
                password: Zeroizing::new(password.clone()),
            })),
            (None, None) => Ok(None),
            _ => Err(SettingsError::PartialDemoAccount),
        }
    }
}
