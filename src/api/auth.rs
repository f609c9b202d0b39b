use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::gateway::{Call, RequestError};
use crate::session::state::{Identity, Role};

pub const LOGIN_PATH: &str = "/auth/login";
pub const ME_PATH: &str = "/auth/me";
pub const REGISTER_PATH: &str = "/auth/register";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default = "TokenResponse::default_token_type")]
    pub token_type: String,

    /// Lifetime of the token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    fn default_token_type() -> String {
        String::from("bearer")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Client {
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, RequestError> {
        self.store().login(username, password).await
    }

    pub fn logout(&self) {
        self.store().logout()
    }

    pub async fn revalidate(&self) -> Result<(), RequestError> {
        self.store().revalidate().await
    }

    /// The identity of the current session, without asking the server.
    pub fn whoami(&self) -> Option<Identity> {
        self.session().identity()
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<(), RequestError> {
        let call = Call::post(REGISTER_PATH).json(req)?.detached();
        self.gateway().send_unit(call).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_token_response() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc.def.ghi",
            "token_type": "bearer",
            "expires_in": 86400,
        }))
        .unwrap();
        assert_eq!(token.expires_in, Some(86400));

        let token: TokenResponse =
            serde_json::from_value(json!({"access_token": "abc"})).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, None);
    }

    #[test]
    fn test_register_request_skips_empty() {
        let req = RegisterRequest {
            username: String::from("carol"),
            email: String::from("carol@library.local"),
            password: String::from("secret123"),
            full_name: None,
            phone: None,
            role: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "username": "carol",
                "email": "carol@library.local",
                "password": "secret123",
            })
        );
    }
}
