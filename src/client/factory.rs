use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;

use crate::config::{CommonConfig, PathSet};
use crate::gateway::{Gateway, LogNotifier, Router};
use crate::session::storage::FileStorage;
use crate::session::Session;

use super::config::ClientConfig;
use super::Client;

pub struct ClientFactory {
    cfg: ClientConfig,
}

impl ClientFactory {
    pub fn load(ps: &PathSet) -> Result<Self> {
        let cfg = ps.load_config("client", ClientConfig::default)?;
        Ok(Self { cfg })
    }

    /// Hydrates the session from the configured session file.
    pub fn build_session(&self) -> Result<Arc<Session>> {
        debug!("Open session file '{}'", self.cfg.session_path);
        let storage = FileStorage::new(&self.cfg.session_path);
        let session = Session::open(storage).context("open session")?;
        Ok(Arc::new(session))
    }

    pub fn build_client(&self) -> Result<Client> {
        let session = self.build_session()?;
        let router = Arc::new(Router::for_session(&session));
        let gateway = Gateway::builder(self.cfg.api_url(), session)
            .navigator(router)
            .notifier(Arc::new(LogNotifier))
            .timeout(self.cfg.timeout())
            .accept_invalid_certs(self.cfg.accept_invalid_certs)
            .build()
            .context("build gateway")?;
        Ok(Client::new(gateway))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }
}
