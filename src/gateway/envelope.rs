use serde_json::Value;

/// The code the backend puts in a successful envelope.
pub const SUCCESS_CODE: i64 = 200;

/// An envelope whose code is not [`SUCCESS_CODE`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeFailure {
    pub code: i64,
    pub message: Option<String>,
}

/// Extracts the payload from a response body.
///
/// Bodies that do not follow the envelope convention pass through unmodified:
/// an empty body becomes `null`, a non-JSON body becomes a JSON string and a JSON
/// value without a `code` field is returned as is. For enveloped bodies, the
/// success code yields `data` when it is present and not null, otherwise the
/// whole body.
pub fn unwrap_envelope(body: &[u8]) -> Result<Value, EnvelopeFailure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return Ok(Value::String(String::from_utf8_lossy(body).into_owned())),
    };

    let code = match value.get("code") {
        Some(code) => code,
        None => return Ok(value),
    };

    // Numbers are compared by value, so `200.0` counts as success too.
    if code.as_f64() == Some(SUCCESS_CODE as f64) {
        return Ok(match value.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            _ => value,
        });
    }

    Err(EnvelopeFailure {
        code: code
            .as_i64()
            .or_else(|| code.as_f64().map(|code| code as i64))
            .unwrap_or_default(),
        message: value
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(String::from),
    })
}
