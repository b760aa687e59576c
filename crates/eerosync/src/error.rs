//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use eerosync_config::ConfigError;
use eerosync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the eero service at {url}")]
    #[diagnostic(
        code(eerosync::unreachable),
        help(
            "Check your network connection and try again.\n\
             Reason: {reason}"
        )
    )]
    Unreachable { url: String, reason: String },

    #[error("Sync failed: could not reach service")]
    #[diagnostic(
        code(eerosync::sync_failed),
        help(
            "The previous snapshot was kept. Re-run with -v for details.\n\
             Reason: {reason}"
        )
    )]
    SyncFailed { reason: String },

    #[error("Request timed out: {what}")]
    #[diagnostic(
        code(eerosync::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout { what: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not logged in for profile '{profile}'")]
    #[diagnostic(
        code(eerosync::not_logged_in),
        help(
            "Run: eerosync login --profile {profile}\n\
             Or set EEROSYNC_USER_TOKEN."
        )
    )]
    NotLoggedIn { profile: String },

    #[error("The eero service rejected the session: {message}")]
    #[diagnostic(
        code(eerosync::auth_failed),
        help("The session token expired for good. Run: eerosync login")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(eerosync::not_found),
        help("Run: eerosync {list_command} to see available ids")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(eerosync::api_error))]
    ApiError { status: u16, message: String },

    #[error("Setting was not applied: {reason}")]
    #[diagnostic(code(eerosync::not_applied))]
    NotApplied { reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(eerosync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(eerosync::config),
        help("Check the profile in your eerosync config file.")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(eerosync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(eerosync::prompt))]
    Prompt(#[from] dialoguer::Error),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::SyncFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotLoggedIn { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::Unreachable { url, reason },

            CoreError::Timeout { url } => CliError::Timeout { what: url },

            CoreError::CycleTimeout { timeout_secs } => CliError::Timeout {
                what: format!("sync cycle did not finish within {timeout_secs}s"),
            },

            CoreError::NotAuthenticated => CliError::NotLoggedIn {
                profile: "current".into(),
            },

            CoreError::NotFound { kind, identifier } => CliError::NotFound {
                list_command: format!("{kind}s list"),
                resource_type: kind,
                identifier,
            },

            CoreError::MissingUrl {
                kind,
                identifier,
                resource,
            } => CliError::NotApplied {
                reason: format!("{kind} {identifier} has no `{resource}` resource URL"),
            },

            CoreError::Api {
                message, status, ..
            } if status == 401 => CliError::AuthFailed { message },

            CoreError::Api {
                message, status, ..
            } => CliError::ApiError { status, message },

            CoreError::Decode { status, message } => CliError::ApiError { status, message },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } | CoreError::Internal(message) => {
                CliError::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_service_maps_to_connection_exit_code() {
        let err = CliError::from(CoreError::ConnectionFailed {
            url: "https://api-user.e2ro.com/2.2/account".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);

        let err = CliError::from(CoreError::CycleTimeout { timeout_secs: 5 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn rejected_session_maps_to_auth_exit_code() {
        let err = CliError::from(CoreError::Api {
            message: "Unauthorized".into(),
            status: 401,
            code: Some(401),
            error: Some("error.session.invalid".into()),
            payload: String::new(),
        });
        assert!(matches!(err, CliError::AuthFailed { .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(CoreError::Api {
            message: "Bad Request".into(),
            status: 400,
            code: Some(400),
            error: None,
            payload: String::new(),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
