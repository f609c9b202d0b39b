use std::fmt::{self, Display};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Librarian,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
            Role::User => "user",
        }
    }

    /// Admins and librarians manage users and borrow records.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Librarian)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The profile returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

/// A bearer token and, when the backend declared one, the unix time it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: Option<u64>,
}

impl Credential {
    /// Builds a credential from the lifetime reported by the login endpoint.
    pub fn issued_now(token: String, expires_in: Option<u64>) -> Self {
        let now = Utc::now().timestamp() as u64;
        Self {
            token,
            expires_at: expires_in.map(|secs| now.saturating_add(secs)),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }
}

/// Who is logged in, and with what. This is also the persisted layout:
/// `{"token": .., "user": .., "isAuthenticated": .., "expiresAt": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,

    pub user: Option<Identity>,

    #[serde(default)]
    pub is_authenticated: bool,
}

impl SessionState {
    pub fn authenticated(credential: Credential, identity: Identity) -> Self {
        Self {
            token: Some(credential.token),
            expires_at: credential.expires_at,
            user: Some(identity),
            is_authenticated: true,
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.token.as_ref().map(|token| Credential {
            token: token.clone(),
            expires_at: self.expires_at,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }

    /// Drops states that break the token/user pairing. A token without a user is
    /// kept: it is revalidated at startup.
    pub(crate) fn normalize(mut self) -> Self {
        if self.token.is_none() {
            return Self::default();
        }
        self.is_authenticated = true;
        self
    }
}
