use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::error::RequestError;

/// One API call, described independently of how it will be sent.
#[derive(Debug, Clone)]
pub struct Call {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) bearer: Option<String>,
    pub(crate) detached: bool,
}

impl Call {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            detached: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body)
            .map_err(|err| RequestError::Client(format!("encode request body: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Appends query parameters from a struct or map. `null` fields are skipped,
    /// arrays repeat the key.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(query)
            .map_err(|err| RequestError::Client(format!("encode query: {err}")))?;
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Ok(self),
            _ => return Err(RequestError::Client(String::from("query must be a struct or map"))),
        };

        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::Array(values) => {
                    for value in values {
                        let value = query_value(&key, value)?;
                        self.query.push((key.clone(), value));
                    }
                }
                value => {
                    let value = query_value(&key, value)?;
                    self.query.push((key, value));
                }
            }
        }
        Ok(self)
    }

    /// Authenticates with `token` instead of the stored credential.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Unbinds the call from the stored session: the stored credential is not
    /// attached and a 401 answer does not expire the session.
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn query_value(key: &str, value: Value) -> Result<String, RequestError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(RequestError::Client(format!(
            "query field '{key}' must be a scalar"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct BookQuery {
        page: u64,
        page_size: u64,
        keyword: Option<String>,
        is_active: Option<bool>,
    }

    #[test]
    fn test_query_skips_none() {
        let call = Call::get("/books")
            .query(&BookQuery {
                page: 1,
                page_size: 10,
                keyword: None,
                is_active: Some(true),
            })
            .unwrap();

        let mut query = call.query;
        query.sort();
        assert_eq!(
            query,
            vec![
                (String::from("is_active"), String::from("true")),
                (String::from("page"), String::from("1")),
                (String::from("page_size"), String::from("10")),
            ]
        );
    }

    #[test]
    fn test_query_rejects_nested() {
        #[derive(Serialize)]
        struct Nested {
            inner: BookQuery,
        }

        let err = Call::get("/books")
            .query(&Nested {
                inner: BookQuery {
                    page: 1,
                    page_size: 10,
                    keyword: None,
                    is_active: None,
                },
            })
            .unwrap_err();
        assert!(matches!(err, RequestError::Client(_)));
    }

    #[test]
    fn test_builders() {
        let call = Call::post("/auth/login")
            .json(&serde_json::json!({"username": "admin"}))
            .unwrap()
            .bearer("tok")
            .detached();
        assert_eq!(call.method(), &Method::POST);
        assert_eq!(call.path(), "/auth/login");
        assert_eq!(call.bearer.as_deref(), Some("tok"));
        assert!(call.detached);
        assert!(call.body.is_some());
    }
}
