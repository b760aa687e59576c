// eero response envelope
//
// Every endpoint answers `{ meta: { code, server_time, error? }, data }`.
// Only `data` is handed to callers; `meta` drives error classification.

use serde::Deserialize;
use serde_json::Value;

/// Decoded response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub data: Value,
}

/// Envelope metadata.
#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    pub code: Option<i64>,
    pub error: Option<String>,
    pub server_time: Option<String>,
}

/// Payload of `/2.2/login`, `/2.2/login/refresh` and `/2.2/login/verify`
/// that the session cares about.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenData {
    pub user_token: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_has_no_data() {
        let env: Envelope = serde_json::from_value(json!({
            "meta": { "code": 401, "error": "error.session.invalid", "server_time": "2024-01-01T00:00:00Z" }
        }))
        .unwrap();
        assert_eq!(env.meta.code, Some(401));
        assert_eq!(env.meta.error.as_deref(), Some("error.session.invalid"));
        assert!(env.data.is_null());
    }

    #[test]
    fn missing_meta_defaults() {
        let env: Envelope = serde_json::from_value(json!({ "data": { "name": "Home" } })).unwrap();
        assert_eq!(env.meta.code, None);
        assert_eq!(env.data["name"], "Home");
    }
}
