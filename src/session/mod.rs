pub mod state;
pub mod storage;

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};

use crate::api::auth::{LoginRequest, TokenResponse, LOGIN_PATH, ME_PATH};
use crate::gateway::{Call, Gateway, Location, Navigator, Notice, RequestError};

use state::{Credential, Identity, SessionState};
use storage::SessionStorage;

pub const LOGIN_NOTICE: &str = "Login successful";

/// The process-wide session: the single source of truth for who is logged in.
///
/// Readers always see the latest state. Mutations are crate-private and go
/// through [`SessionStore`] or the gateway's expiry handling; each one is
/// written to storage before the lock is released.
pub struct Session {
    state: Mutex<SessionState>,
    storage: Box<dyn SessionStorage>,
}

impl Session {
    /// Opens the session, hydrating it from `storage`. This is the only read of
    /// the storage during the session's lifetime.
    pub fn open(storage: impl SessionStorage + 'static) -> Result<Self> {
        let state = match storage.load()? {
            Some(state) => Self::hydrate(state),
            None => SessionState::default(),
        };

        Ok(Self {
            state: Mutex::new(state),
            storage: Box::new(storage),
        })
    }

    fn hydrate(state: SessionState) -> SessionState {
        let state = state.normalize();
        if let Some(credential) = state.credential() {
            let now = Utc::now().timestamp() as u64;
            if credential.is_expired(now) {
                info!("Stored session has expired, a new login is required");
                return SessionState::default();
            }
        }
        state
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    pub(crate) fn establish(&self, credential: Credential, identity: Identity) {
        let mut state = self.lock();
        *state = SessionState::authenticated(credential, identity);
        self.persist(&state);
    }

    /// Replaces the identity, as long as the session still holds `token`.
    pub(crate) fn set_identity(&self, token: &str, identity: Identity) -> bool {
        let mut state = self.lock();
        if state.token.as_deref() != Some(token) {
            return false;
        }
        state.user = Some(identity);
        self.persist(&state);
        true
    }

    /// Returns whether there was anything to clear.
    pub(crate) fn clear(&self) -> bool {
        let mut state = self.lock();
        if state.is_empty() && !state.is_authenticated {
            return false;
        }
        *state = SessionState::default();
        self.persist(&state);
        true
    }

    /// Clears the session only while it still holds `token`.
    pub(crate) fn clear_if(&self, token: &str) -> bool {
        let mut state = self.lock();
        if state.token.as_deref() != Some(token) {
            return false;
        }
        *state = SessionState::default();
        self.persist(&state);
        true
    }

    /// The in-memory state stays authoritative when storage fails.
    fn persist(&self, state: &SessionState) {
        if let Err(err) = self.storage.save(state) {
            warn!("Persist session failed: {err:#}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Login, logout and revalidation of the shared [`Session`].
#[derive(Clone)]
pub struct SessionStore {
    gateway: Gateway,
}

impl SessionStore {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn session(&self) -> &Session {
        self.gateway.session()
    }

    /// Exchanges the credentials for a token, then fetches the identity with it.
    ///
    /// Both are committed together once both calls succeed, so a failure leaves
    /// the session exactly as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, RequestError> {
        info!("Logging in to server as '{username}'");
        let call = Call::post(LOGIN_PATH)
            .json(&LoginRequest { username, password })?
            .detached();
        let token: TokenResponse = self.gateway.send(call).await.map_err(reject_login)?;
        if token.access_token.is_empty() {
            return Err(RequestError::Auth(String::from(
                "server returned an empty token",
            )));
        }
        let credential = Credential::issued_now(token.access_token, token.expires_in);

        let call = Call::get(ME_PATH).bearer(&credential.token).detached();
        let identity: Identity = self.gateway.send(call).await.map_err(reject_login)?;

        self.session().establish(credential, identity.clone());
        self.gateway.navigator().navigate(Location::Home);
        self.gateway.notify(Notice::info(LOGIN_NOTICE));
        info!(
            "Login success, user '{}' with role '{}'",
            identity.username, identity.role
        );
        Ok(identity)
    }

    /// Drops the credential and identity. Never touches the network.
    pub fn logout(&self) {
        if self.session().clear() {
            info!("Logged out");
        } else {
            debug!("Logout without session, nothing to do");
        }
    }

    /// Confirms the stored credential is still accepted by refetching the
    /// identity. On failure the session is cleared and the error returned.
    pub async fn revalidate(&self) -> Result<(), RequestError> {
        let token = match self.session().token() {
            Some(token) => token,
            None => {
                debug!("No stored credential, skip revalidation");
                return Ok(());
            }
        };

        match self.gateway.send::<Identity>(Call::get(ME_PATH)).await {
            Ok(identity) => {
                if !self.session().set_identity(&token, identity) {
                    debug!("Session changed during revalidation, keep the newer one");
                }
                Ok(())
            }
            Err(err) => {
                warn!("Stored session is no longer valid: {err}");
                if !self.session().clear_if(&token) {
                    debug!("Session changed during revalidation, keep the newer one");
                }
                Err(err)
            }
        }
    }
}

/// Anything the server says against a login attempt is an authentication
/// failure; only network trouble keeps its own kind.
fn reject_login(err: RequestError) -> RequestError {
    match err {
        RequestError::Application { message, .. } => RequestError::Auth(message),
        RequestError::Transport {
            status: Some(status),
            message,
        } if (400..500).contains(&status) => RequestError::Auth(message),
        err => err,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::gateway::{InboundResponse, OutboundRequest, Router, Transport};
    use crate::session::state::Role;
    use crate::session::storage::MemoryStorage;

    /// Logs another user in while the request is in flight, then rejects it.
    struct ReplacingTransport {
        session: Arc<Session>,
    }

    #[async_trait]
    impl Transport for ReplacingTransport {
        async fn send(&self, _req: OutboundRequest) -> Result<InboundResponse> {
            self.session.establish(
                Credential {
                    token: String::from("newer"),
                    expires_at: None,
                },
                identity(),
            );
            Ok(InboundResponse {
                status: 401,
                body: serde_json::to_vec(&json!({"detail": "Token expired"}))?,
            })
        }
    }

    fn identity() -> Identity {
        Identity {
            id: 2,
            username: String::from("bob"),
            email: String::from("bob@library.local"),
            role: Role::User,
        }
    }

    #[test]
    fn test_open_discards_expired_credential() {
        let state = SessionState::authenticated(
            Credential {
                token: String::from("old"),
                expires_at: Some(1),
            },
            identity(),
        );
        let session = Session::open(MemoryStorage::with_state(state)).unwrap();
        assert_eq!(session.snapshot(), SessionState::default());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = MemoryStorage::with_state(SessionState::authenticated(
            Credential {
                token: String::from("t"),
                expires_at: None,
            },
            identity(),
        ));
        let session = Session::open(storage).unwrap();
        assert!(session.is_authenticated());

        assert!(session.clear());
        let once = session.snapshot();
        assert!(!session.clear());
        assert_eq!(session.snapshot(), once);
        assert_eq!(once, SessionState::default());
    }

    #[test]
    fn test_set_identity_requires_same_token() {
        let session = Session::open(MemoryStorage::default()).unwrap();
        assert!(!session.set_identity("t", identity()));
        assert!(session.identity().is_none());

        session.establish(
            Credential {
                token: String::from("t"),
                expires_at: None,
            },
            identity(),
        );
        let mut renamed = identity();
        renamed.username = String::from("robert");
        assert!(session.set_identity("t", renamed.clone()));
        assert_eq!(session.identity(), Some(renamed));
    }

    #[test]
    fn test_clear_if_same_token() {
        let session = Session::open(MemoryStorage::default()).unwrap();
        session.establish(
            Credential {
                token: String::from("t"),
                expires_at: None,
            },
            identity(),
        );

        assert!(!session.clear_if("other"));
        assert!(session.is_authenticated());
        assert!(session.clear_if("t"));
        assert_eq!(session.snapshot(), SessionState::default());
        assert!(!session.clear_if("t"));
    }

    #[tokio::test]
    async fn test_revalidate_keeps_newer_session() {
        let stale = SessionState::authenticated(
            Credential {
                token: String::from("stale"),
                expires_at: None,
            },
            identity(),
        );
        let session = Arc::new(Session::open(MemoryStorage::with_state(stale)).unwrap());
        let router = Arc::new(Router::for_session(&session));
        let gateway = Gateway::builder("http://library.local/api/v1", session.clone())
            .transport(ReplacingTransport {
                session: session.clone(),
            })
            .navigator(router.clone())
            .build()
            .unwrap();

        let err = SessionStore::new(gateway).revalidate().await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(session.token().as_deref(), Some("newer"));
        assert!(session.is_authenticated());
        assert_eq!(router.current(), Location::Home);
        assert_eq!(router.redirects(), 0);
    }

    #[test]
    fn test_reject_login() {
        let err = reject_login(RequestError::Transport {
            status: Some(400),
            message: String::from("user disabled"),
        });
        assert_eq!(err, RequestError::Auth(String::from("user disabled")));

        let err = reject_login(RequestError::Transport {
            status: None,
            message: String::from("connection refused"),
        });
        assert!(matches!(err, RequestError::Transport { .. }));
    }
}
