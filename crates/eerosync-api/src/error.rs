use thiserror::Error;

/// Remote error strings that mean the session token can be refreshed.
pub const SESSION_REFRESH_ERRORS: [&str; 2] = ["error.session.invalid", "error.session.refresh"];

/// Top-level error type for the `eerosync-api` crate.
///
/// Covers transport, envelope decoding and remote rejections.
/// `eerosync-core` maps these into `CoreError` variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Remote ──────────────────────────────────────────────────────
    /// Non-success response carrying the eero `{meta: {code, error}}` envelope.
    #[error("Bad response received from {url} (HTTP {status}): {message}")]
    Api {
        url: String,
        status: u16,
        code: Option<i64>,
        error: Option<String>,
        message: String,
        payload: String,
    },

    /// Response body could not be decoded as JSON.
    #[error("Unable to decode JSON (HTTP {status}): {message}")]
    Decode {
        status: u16,
        message: String,
        body: String,
    },

    /// A successful response was missing a field the session needs.
    #[error("Response is missing `{field}`")]
    MissingField { field: &'static str },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl Error {
    /// Returns `true` if this error is an expired session that a single
    /// `/login/refresh` call can recover.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::Api {
                status,
                code,
                error: Some(error),
                ..
            } => {
                (*status == 401 || *code == Some(401))
                    && SESSION_REFRESH_ERRORS.contains(&error.as_str())
            }
            _ => false,
        }
    }

    /// Returns `true` if the remote service could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The remote error string (e.g. `error.session.invalid`), if any.
    pub fn remote_error(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, error: Option<&str>) -> Error {
        Error::Api {
            url: "/2.2/account".into(),
            status,
            code: Some(i64::from(status)),
            error: error.map(Into::into),
            message: "Unauthorized".into(),
            payload: String::new(),
        }
    }

    #[test]
    fn session_expiry_requires_401_and_known_error() {
        assert!(api(401, Some("error.session.invalid")).is_session_expired());
        assert!(api(401, Some("error.session.refresh")).is_session_expired());
        assert!(!api(401, Some("error.login.invalid")).is_session_expired());
        assert!(!api(401, None).is_session_expired());
        assert!(!api(403, Some("error.session.invalid")).is_session_expired());
    }

    #[test]
    fn status_and_remote_error_are_exposed() {
        let err = api(404, Some("error.network.not_found"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.remote_error(), Some("error.network.not_found"));
        assert!(!err.is_unreachable());
        assert!(Error::Timeout { url: "x".into() }.is_unreachable());
    }
}
