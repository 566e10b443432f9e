//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::config::{AppSettings, BuildMode, DemoAccount, SettingsError};

/// Validated configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_lifetime: Duration,
    pub(crate) cookie_secure: bool,
    pub(crate) demo: Option<DemoAccount>,
}

impl ServerConfig {
    /// Construct a server configuration with defaults for everything but
    /// the signing secret.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bind_addr,
            jwt_secret: Zeroizing::new(jwt_secret.into()),
            token_lifetime: Duration::from_secs(24 * 60 * 60),
            cookie_secure: false,
            demo: None,
        }
    }

    /// Validate loaded settings for the given build mode.
    pub fn from_settings(settings: &AppSettings, mode: BuildMode) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            jwt_secret: settings.jwt_secret(mode)?,
            token_lifetime: settings.token_lifetime()?,
            cookie_secure: settings.cookie_secure,
            demo: settings.demo_account()?,
        })
    }

    /// Seed a read-only demo account at startup.
    #[must_use]
    pub fn with_demo_account(mut self, demo: DemoAccount) -> Self {
        self.demo = Some(demo);
        self
    }

    /// Mark session cookies `Secure`.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
