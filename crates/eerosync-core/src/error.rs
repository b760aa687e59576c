// ── Core error types ──
//
// Errors surfaced by the resource model and the sync engine. The
// `From<eerosync_api::Error>` impl folds transport-layer failures into
// domain variants while keeping the remote status and payload.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Could not reach the eero service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Sync cycle exceeded {timeout_secs}s")]
    CycleTimeout { timeout_secs: u64 },

    #[error("Not logged in: no session token")]
    NotAuthenticated,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{kind} not found: {identifier}")]
    NotFound { kind: String, identifier: String },

    #[error("{kind} {identifier} has no `{resource}` resource URL")]
    MissingUrl {
        kind: String,
        identifier: String,
        resource: String,
    },

    #[error("Unable to decode response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    Api {
        message: String,
        status: u16,
        /// `meta.code` of the error envelope.
        code: Option<i64>,
        /// `meta.error`, e.g. `error.session.invalid`.
        error: Option<String>,
        /// Raw response body.
        payload: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` when the service was never reached, as opposed to rejecting
    /// the request.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::CycleTimeout { .. }
        )
    }

    /// `true` for a rejected or expired session.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::NotAuthenticated => true,
            Self::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<eerosync_api::Error> for CoreError {
    fn from(err: eerosync_api::Error) -> Self {
        match err {
            eerosync_api::Error::Api {
                url,
                status,
                code,
                error,
                message,
                payload,
            } => CoreError::Api {
                message: format!("{message} ({url})"),
                status,
                code,
                error,
                payload,
            },
            eerosync_api::Error::Decode {
                status, message, ..
            } => CoreError::Decode { status, message },
            eerosync_api::Error::MissingField { field } => CoreError::Decode {
                status: 200,
                message: format!("response is missing `{field}`"),
            },
            eerosync_api::Error::Timeout { url } => CoreError::Timeout { url },
            eerosync_api::Error::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            eerosync_api::Error::InvalidUrl(e) => CoreError::Validation {
                message: format!("invalid URL: {e}"),
            },
            eerosync_api::Error::Client(message) => CoreError::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_remote_detail() {
        let err = CoreError::from(eerosync_api::Error::Api {
            url: "/2.2/account".into(),
            status: 401,
            code: Some(401),
            error: Some("error.session.invalid".into()),
            message: "Unauthorized".into(),
            payload: "{}".into(),
        });
        assert!(err.is_auth_failure());
        assert!(!err.is_unreachable());
        match err {
            CoreError::Api { error, payload, .. } => {
                assert_eq!(error.as_deref(), Some("error.session.invalid"));
                assert_eq!(payload, "{}");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn timeouts_are_unreachable() {
        let err = CoreError::from(eerosync_api::Error::Timeout {
            url: "https://api-user.e2ro.com/2.2/account".into(),
        });
        assert!(err.is_unreachable());
    }
}
