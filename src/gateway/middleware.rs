//! The stages every call goes through, as plain functions. [`super::Gateway`]
//! composes them around the transport and performs the side effects.

use serde_json::Value;

use super::call::Call;
use super::transport::{InboundResponse, OutboundRequest, HEADER_AUTHORIZATION};

pub const STATUS_UNAUTHORIZED: u16 = 401;

/// A response whose HTTP status is not 2xx.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusFailure {
    pub status: u16,
    /// Message provided by the server, if any.
    pub message: Option<String>,
}

impl StatusFailure {
    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }
}

/// Resolves `call` against `base_url` and attaches the bearer credential.
///
/// An explicit token on the call wins. Otherwise `stored` is used unless the
/// call is detached. Without any token the request goes out unauthenticated.
pub fn attach_credential(base_url: &str, call: Call, stored: Option<String>) -> OutboundRequest {
    let token = match call.bearer {
        Some(token) => Some(token),
        None if call.detached => None,
        None => stored,
    };

    let mut headers = Vec::new();
    if let Some(token) = token {
        headers.push((HEADER_AUTHORIZATION.to_string(), format!("Bearer {token}")));
    }

    let path = call.path.trim_start_matches('/');
    OutboundRequest {
        method: call.method,
        url: format!("{}/{}", base_url.trim_end_matches('/'), path),
        query: call.query,
        headers,
        body: call.body,
    }
}

pub fn check_status(resp: InboundResponse) -> Result<InboundResponse, StatusFailure> {
    if (200..300).contains(&resp.status) {
        return Ok(resp);
    }
    Err(StatusFailure {
        status: resp.status,
        message: failure_message(&resp.body),
    })
}

/// Picks the server's explanation out of an error body: the envelope's
/// `message`, else the `detail` the backend framework emits for raised errors.
pub fn failure_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "detail"]
        .into_iter()
        .filter_map(|key| value.get(key))
        .find_map(|message| match message {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_attach_stored_credential() {
        let req = attach_credential(
            "http://localhost:8000/api/v1/",
            Call::get("/books"),
            Some(String::from("stored")),
        );
        assert_eq!(req.url, "http://localhost:8000/api/v1/books");
        assert_eq!(req.header("authorization"), Some("Bearer stored"));
    }

    #[test]
    fn test_attach_without_credential() {
        let req = attach_credential("http://localhost/api/v1", Call::get("books"), None);
        assert_eq!(req.url, "http://localhost/api/v1/books");
        assert_eq!(req.header(HEADER_AUTHORIZATION), None);
    }

    #[test]
    fn test_attach_explicit_and_detached() {
        let req = attach_credential(
            "http://localhost",
            Call::get("/auth/me").bearer("fresh").detached(),
            Some(String::from("stored")),
        );
        assert_eq!(req.header(HEADER_AUTHORIZATION), Some("Bearer fresh"));

        let req = attach_credential(
            "http://localhost",
            Call::post("/auth/login").detached(),
            Some(String::from("stored")),
        );
        assert_eq!(req.header(HEADER_AUTHORIZATION), None);
    }

    #[test]
    fn test_check_status() {
        let ok = InboundResponse {
            status: 204,
            body: Vec::new(),
        };
        assert!(check_status(ok).is_ok());

        let failure = check_status(InboundResponse {
            status: 401,
            body: serde_json::to_vec(&json!({"code": 401, "message": "expired"})).unwrap(),
        })
        .unwrap_err();
        assert!(failure.is_unauthorized());
        assert_eq!(failure.message.as_deref(), Some("expired"));
    }

    #[test]
    fn test_failure_message() {
        let body = serde_json::to_vec(&json!({"detail": "Book not found"})).unwrap();
        assert_eq!(failure_message(&body).as_deref(), Some("Book not found"));

        let body = serde_json::to_vec(&json!({"message": "", "detail": "fallback"})).unwrap();
        assert_eq!(failure_message(&body).as_deref(), Some("fallback"));

        // Validation errors carry a list in `detail`, there is no single message.
        let body = serde_json::to_vec(&json!({"detail": [{"loc": ["body", "isbn"]}]})).unwrap();
        assert_eq!(failure_message(&body), None);

        assert_eq!(failure_message(b"<html>Bad Gateway</html>"), None);
    }
}
