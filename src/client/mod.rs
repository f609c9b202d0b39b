pub mod config;
pub mod factory;

use std::sync::Arc;

use crate::gateway::{Gateway, Location, Navigator, RequestError};
use crate::session::{Session, SessionStore};

/// Typed access to the library backend for the current session.
///
/// The resource operations live next to their types under [`crate::api`].
#[derive(Clone)]
pub struct Client {
    gateway: Gateway,
    store: SessionStore,
}

impl Client {
    pub fn new(gateway: Gateway) -> Self {
        let store = SessionStore::new(gateway.clone());
        Self { gateway, store }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn session(&self) -> &Arc<Session> {
        self.gateway.session()
    }

    /// Fails with [`RequestError::SessionExpired`] and redirects to the login
    /// boundary when nobody is logged in.
    pub fn require_login(&self) -> Result<(), RequestError> {
        if self.session().is_authenticated() {
            return Ok(());
        }
        self.gateway.navigator().navigate(Location::Login);
        Err(RequestError::SessionExpired(String::from("login required")))
    }
}

#[cfg(test)]
mod tests {
    use crate::gateway::Router;
    use crate::session::storage::MemoryStorage;

    use super::*;

    #[test]
    fn test_require_login() {
        let session = Arc::new(Session::open(MemoryStorage::default()).unwrap());
        let router = Arc::new(Router::new(Location::Home));
        let gateway = Gateway::builder("http://127.0.0.1:1/api/v1", session)
            .navigator(router.clone())
            .build()
            .unwrap();
        let client = Client::new(gateway);

        let err = client.require_login().unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(router.current(), Location::Login);
        assert_eq!(router.redirects(), 1);
    }
}
