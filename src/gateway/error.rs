use thiserror::Error;

/// Every way a call through the gateway can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// The backend refused the credentials presented at login.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A bound call was answered with 401, the stored session has been dropped.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The HTTP exchange succeeded but the envelope carries a failure code.
    #[error("Server error: code {code}, {message}")]
    Application { code: i64, message: String },

    /// Network failure, timeout, non-2xx status or a body we could not decode.
    #[error("{}", transport_display(.status, .message))]
    Transport { status: Option<u16>, message: String },

    /// The request could not be built locally.
    #[error("Client error: {0}")]
    Client(String),
}

fn transport_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Request failed: status {status}, {message}"),
        None => format!("Network error: {message}"),
    }
}

impl RequestError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, RequestError::SessionExpired(_))
    }

    /// The HTTP status that caused the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Transport { status, .. } => *status,
            RequestError::SessionExpired(_) => Some(401),
            _ => None,
        }
    }

    /// The human readable part of the failure, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            RequestError::Auth(message)
            | RequestError::SessionExpired(message)
            | RequestError::Client(message) => message,
            RequestError::Application { message, .. } | RequestError::Transport { message, .. } => {
                message
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        RequestError::Transport {
            status: None,
            message: format!("malformed response: {err}"),
        }
    }
}
