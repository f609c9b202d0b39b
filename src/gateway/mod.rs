pub mod call;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod navigate;
pub mod notify;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::session::Session;

pub use call::Call;
pub use error::RequestError;
pub use navigate::{Location, Navigator, Router};
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier};
pub use transport::{HttpTransport, InboundResponse, OutboundRequest, Transport};

use middleware::{attach_credential, check_status, StatusFailure};

pub const GENERIC_FAILURE: &str = "Request failed";
pub const NETWORK_FAILURE: &str = "Network error";
pub const MALFORMED_RESPONSE: &str = "Malformed response";
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired, please log in again";

/// The single outbound channel to the backend.
///
/// Cloning is cheap, clones share the transport, session, notifier and navigator.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    transport: Box<dyn Transport>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

pub struct GatewayBuilder {
    base_url: String,
    session: Arc<Session>,
    transport: Option<Box<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl Gateway {
    pub fn builder(base_url: impl Into<String>, session: Arc<Session>) -> GatewayBuilder {
        GatewayBuilder {
            base_url: base_url.into(),
            session,
            transport: None,
            notifier: None,
            navigator: None,
            timeout: GatewayBuilder::DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    /// Sends `call` and deserializes the unwrapped payload into `T`.
    pub async fn send<T: DeserializeOwned>(&self, call: Call) -> Result<T, RequestError> {
        let path = call.path.clone();
        let payload = self.execute(call).await?;
        serde_json::from_value(payload).map_err(|err| {
            warn!("Decode response of '{path}' failed: {err}");
            self.notify(Notice::error(MALFORMED_RESPONSE));
            RequestError::malformed(err)
        })
    }

    /// Sends `call` and discards the payload.
    pub async fn send_unit(&self, call: Call) -> Result<(), RequestError> {
        self.execute(call).await.map(|_| ())
    }

    /// Sends `call` and returns the unwrapped payload.
    ///
    /// Failures are returned to the caller and announced through the notifier.
    /// A 401 on a call bound to the session additionally clears the session
    /// and redirects to the login boundary.
    pub async fn execute(&self, call: Call) -> Result<Value, RequestError> {
        let detached = call.detached;
        let req = attach_credential(&self.inner.base_url, call, self.inner.session.token());
        debug!("Request server: {} {}", req.method, req.url);
        let sent_token = req.bearer_token().map(String::from);

        let resp = match self.inner.transport.send(req).await {
            Ok(resp) => resp,
            Err(err) => {
                self.notify(Notice::error(NETWORK_FAILURE));
                return Err(RequestError::Transport {
                    status: None,
                    message: format!("{err:#}"),
                });
            }
        };

        let resp = match check_status(resp) {
            Ok(resp) => resp,
            Err(failure) if failure.is_unauthorized() && !detached => {
                return Err(self.expire_session(failure, sent_token.as_deref()));
            }
            Err(failure) if failure.is_unauthorized() => {
                let message = failure.message.unwrap_or_else(|| String::from("unauthorized"));
                self.notify(Notice::error(message.clone()));
                return Err(RequestError::Auth(message));
            }
            Err(failure) => {
                let message = failure
                    .message
                    .unwrap_or_else(|| String::from(NETWORK_FAILURE));
                self.notify(Notice::error(message.clone()));
                return Err(RequestError::Transport {
                    status: Some(failure.status),
                    message,
                });
            }
        };

        match envelope::unwrap_envelope(&resp.body) {
            Ok(payload) => Ok(payload),
            Err(failure) => {
                let message = failure
                    .message
                    .unwrap_or_else(|| String::from(GENERIC_FAILURE));
                self.notify(Notice::error(message.clone()));
                Err(RequestError::Application {
                    code: failure.code,
                    message,
                })
            }
        }
    }

    /// Safe to run from several calls at once: clearing an empty session and
    /// navigating to the current location are both no-ops.
    ///
    /// Only the credential the call was sent with is dropped. A session that
    /// was replaced while the call was in flight stays in place.
    fn expire_session(&self, failure: StatusFailure, sent_token: Option<&str>) -> RequestError {
        let session = &self.inner.session;
        let cleared = match sent_token {
            Some(token) => session.clear_if(token),
            None => session.clear(),
        };
        if cleared {
            warn!("Server rejected the stored credential, session cleared");
        }
        self.notify(Notice::error(SESSION_EXPIRED_NOTICE));
        if !session.is_authenticated() {
            self.inner.navigator.navigate(Location::Login);
        }
        RequestError::SessionExpired(
            failure
                .message
                .unwrap_or_else(|| String::from("unauthorized")),
        )
    }

    pub fn notify(&self, notice: Notice) {
        self.inner.notifier.notify(notice);
    }
}

impl GatewayBuilder {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Only used when no transport is given.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only used when no transport is given.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<Gateway> {
        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(
                self.timeout,
                self.accept_invalid_certs,
            )?),
        };
        let navigator = match self.navigator {
            Some(navigator) => navigator,
            None => Arc::new(Router::for_session(&self.session)),
        };
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        Ok(Gateway {
            inner: Arc::new(Inner {
                base_url: self.base_url.trim_end_matches('/').to_string(),
                transport,
                session: self.session,
                notifier,
                navigator,
            }),
        })
    }
}
