use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "ClientConfig::default_server")]
    pub server: String,

    #[serde(default = "ClientConfig::default_base_path")]
    pub base_path: String,

    #[serde(default = "ClientConfig::default_username")]
    pub username: String,

    #[serde(default = "ClientConfig::default_password")]
    pub password: String,

    #[serde(default = "ClientConfig::default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "ClientConfig::default_session_path")]
    pub session_path: String,

    #[serde(default = "ClientConfig::default_log_level")]
    pub log_level: String,
}

impl CommonConfig for ClientConfig {
    fn default() -> Self {
        Self {
            server: Self::default_server(),
            base_path: Self::default_base_path(),
            username: Self::default_username(),
            password: Self::default_password(),
            timeout_secs: Self::default_timeout_secs(),
            accept_invalid_certs: false,
            session_path: Self::default_session_path(),
            log_level: Self::default_log_level(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.server = expandenv("server", &self.server)?;
        if self.server.is_empty() {
            bail!("server cannot be empty");
        }
        self.server = self.server.trim_end_matches('/').to_string();

        let parsed = match Url::parse(&self.server) {
            Ok(url) => url,
            Err(_) => bail!("invalid server url '{}'", self.server),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => bail!("invalid url scheme, expect 'http' or 'https', not '{scheme}'"),
        }

        self.base_path = expandenv("base_path", &self.base_path)?;
        let base_path = self.base_path.trim_matches('/');
        self.base_path = if base_path.is_empty() {
            String::new()
        } else {
            format!("/{base_path}")
        };

        self.username = expandenv("username", &self.username)?;
        self.password = expandenv("password", &self.password)?;

        if self.timeout_secs < Self::MIN_TIMEOUT_SECS || self.timeout_secs > Self::MAX_TIMEOUT_SECS
        {
            bail!(
                "timeout_secs should be in range [{},{}], found {}",
                Self::MIN_TIMEOUT_SECS,
                Self::MAX_TIMEOUT_SECS,
                self.timeout_secs
            );
        }

        self.session_path = expandenv("session_path", &self.session_path)?;
        if self.session_path.is_empty() {
            let path = ps.data_path.join("session.json");
            self.session_path = format!("{}", path.display());
        }

        match self.log_level.as_str() {
            "error" | "warn" | "info" | "debug" => {}
            level => bail!("unknown log_level '{level}', expect error, warn, info or debug"),
        }

        Ok(())
    }
}

impl ClientConfig {
    const MIN_TIMEOUT_SECS: u64 = 1;
    const MAX_TIMEOUT_SECS: u64 = 600;

    /// The root every API path is resolved against, e.g. `http://127.0.0.1:8000/api/v1`.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.server, self.base_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn default_server() -> String {
        String::from("http://127.0.0.1:8000")
    }

    pub fn default_base_path() -> String {
        String::from("/api/v1")
    }

    pub fn default_username() -> String {
        String::new()
    }

    pub fn default_password() -> String {
        String::new()
    }

    pub fn default_timeout_secs() -> u64 {
        30
    }

    pub fn default_session_path() -> String {
        String::new()
    }

    pub fn default_log_level() -> String {
        String::from("info")
    }
}
