// eero session client
//
// Wraps `reqwest::Client` with the `s=<token>` session cookie, envelope
// unwrapping, and a single refresh-and-retry when the service reports an
// expired session. Everything above this layer sees plain `data` payloads.

use std::sync::{PoisonError, RwLock};

use reqwest::header::COOKIE;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::dump::ResponseDump;
use crate::envelope::{Envelope, TokenData};
use crate::error::Error;
use crate::transport::TransportConfig;

pub const LOGIN_PATH: &str = "/2.2/login";
pub const LOGIN_REFRESH_PATH: &str = "/2.2/login/refresh";
pub const LOGIN_VERIFY_PATH: &str = "/2.2/login/verify";
pub const ACCOUNT_PATH: &str = "/2.2/account";

/// Authenticated connection to the eero cloud API.
///
/// The session token lives here and nowhere else. Refreshes are serialized
/// behind `refresh_gate`; a caller that finds the token already replaced by
/// a concurrent refresh reuses it instead of refreshing again.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    refresh_gate: Mutex<()>,
    dump: Option<ResponseDump>,
}

impl Session {
    /// Create a session from a [`TransportConfig`].
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        let mut session = Self::with_client(http, config.base_url.clone());
        session.dump = config.dump_dir.clone().map(ResponseDump::new);
        Ok(session)
    }

    /// Create a session with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            dump: None,
        }
    }

    /// Seed the session with a previously verified token.
    pub fn with_token(self, token: SecretString) -> Self {
        self.set_token(Some(token));
        self
    }

    /// Write every decoded payload through `dump`.
    pub fn with_dump(mut self, dump: ResponseDump) -> Self {
        self.dump = Some(dump);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current session token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_token(&self, token: Option<SecretString>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    // ── Login flow ───────────────────────────────────────────────────

    /// Start a passwordless login for an email address or phone number.
    ///
    /// Any token already held is dropped first, so the request goes out
    /// without a cookie. The returned provisional token is held by the
    /// session until [`login_verify`](Self::login_verify) confirms it.
    pub async fn login(&self, identifier: &str) -> Result<Value, Error> {
        debug!("starting login");
        self.set_token(None);
        let data = self
            .call(Method::POST, LOGIN_PATH, Some(&json!({ "login": identifier })))
            .await?;
        self.store_token(&data)?;
        Ok(data)
    }

    /// Confirm a login with the code sent out-of-band.
    ///
    /// Returns the raw payload; the caller picks out `user_token` and the
    /// account identifiers it wants to persist.
    pub async fn login_verify(&self, code: &str) -> Result<Value, Error> {
        debug!("verifying login");
        self.call(Method::POST, LOGIN_VERIFY_PATH, Some(&json!({ "code": code })))
            .await
    }

    /// Exchange the current token for a fresh one.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        self.call(Method::GET, path, None).await
    }

    /// GET with a JSON body. The insights and data-usage endpoints take
    /// their query this way.
    pub async fn get_with_body(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.call(Method::GET, path, Some(body)).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, Error> {
        self.call(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        self.call(Method::DELETE, path, None).await
    }

    /// Issue one API call and return the envelope's `data`.
    ///
    /// `path` is either a resource path (`/2.2/...`) joined onto the base
    /// URL or an absolute URL. An expired session triggers exactly one
    /// refresh and one retry; any failure after that is returned as is.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.resolve(path)?;
        let stale = self.token();

        let (status, text) = self.send(&method, &url, body, true).await?;
        let data = match unwrap_envelope(&url, status, text) {
            Err(err) if err.is_session_expired() => {
                debug!(%url, "session expired, refreshing");
                self.refresh_if_stale(stale.as_ref()).await?;
                let (status, text) = self.send(&method, &url, body, true).await?;
                unwrap_envelope(&url, status, text)?
            }
            other => other?,
        };

        self.save_response(path, &data);
        Ok(data)
    }

    /// Fetch a firmware release-notes manifest from its absolute URL.
    ///
    /// The manifest lives on a different host and is not enveloped; no
    /// session cookie is sent.
    pub async fn release_notes(&self, url: &str) -> Result<Value, Error> {
        let url = Url::parse(url)?;
        let (status, text) = self.send(&Method::GET, &url, None, false).await?;
        if !status.is_success() {
            return Err(Error::Api {
                url: url.to_string(),
                status: status.as_u16(),
                code: None,
                error: status.canonical_reason().map(String::from),
                message: format!("Unable to get release notes from URL: {url}"),
                payload: text,
            });
        }
        let notes = decode(status, &text)?;
        self.save_response("release_notes", &notes);
        Ok(notes)
    }

    /// Write `value` to the debug dump under `name`, if a dump is configured.
    pub fn save_response(&self, name: &str, value: &Value) {
        let empty = match value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if let (Some(dump), false) = (&self.dump, empty) {
            dump.save(name, value);
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn resolve(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        with_cookie: bool,
    ) -> Result<(StatusCode, String), Error> {
        debug!("{method} {url}");

        let mut builder = self.http.request(method.clone(), url.clone());
        if with_cookie {
            if let Some(token) = self.token() {
                builder = builder.header(COOKIE, format!("s={}", token.expose_secret()));
            }
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| transport_error(e, url))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error(e, url))?;
        Ok((status, text))
    }

    async fn refresh_if_stale(&self, stale: Option<&SecretString>) -> Result<(), Error> {
        let _gate = self.refresh_gate.lock().await;
        let current = self.token();
        let unchanged = match (stale, current.as_ref()) {
            (Some(old), Some(new)) => old.expose_secret() == new.expose_secret(),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            self.refresh_locked().await
        } else {
            debug!("token already refreshed by a concurrent call");
            Ok(())
        }
    }

    /// Caller must hold `refresh_gate`. Never retries.
    async fn refresh_locked(&self) -> Result<(), Error> {
        debug!("refreshing session");
        let url = self.resolve(LOGIN_REFRESH_PATH)?;
        let (status, text) = self.send(&Method::POST, &url, None, true).await?;
        let data = unwrap_envelope(&url, status, text).inspect_err(|e| {
            warn!(error = %e, "session refresh rejected");
        })?;
        self.store_token(&data)
    }

    fn store_token(&self, data: &Value) -> Result<(), Error> {
        let parsed: TokenData =
            serde_json::from_value(data.clone()).map_err(|e| Error::Decode {
                status: 200,
                message: e.to_string(),
                body: data.to_string(),
            })?;
        let token = parsed
            .user_token
            .ok_or(Error::MissingField { field: "user_token" })?;
        self.set_token(Some(SecretString::from(token)));
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .field("dump", &self.dump.as_ref().map(ResponseDump::dir))
            .finish_non_exhaustive()
    }
}

fn transport_error(e: reqwest::Error, url: &Url) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            url: url.to_string(),
        }
    } else {
        Error::Transport(e)
    }
}

fn decode(status: StatusCode, text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        Error::Decode {
            status: status.as_u16(),
            message: format!("{e} (body preview: {preview:?})"),
            body: text.to_owned(),
        }
    })
}

/// Decode the `{meta, data}` envelope, returning `data` on success or
/// `Error::Api` for any non-success status.
fn unwrap_envelope(url: &Url, status: StatusCode, text: String) -> Result<Value, Error> {
    let envelope: Envelope = serde_json::from_value(decode(status, &text)?).map_err(|e| {
        Error::Decode {
            status: status.as_u16(),
            message: e.to_string(),
            body: text.clone(),
        }
    })?;

    if status.is_success() {
        return Ok(envelope.data);
    }

    Err(Error::Api {
        url: url.to_string(),
        status: status.as_u16(),
        code: envelope.meta.code,
        error: envelope.meta.error,
        message: status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_owned(),
        payload: text,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_failure_keeps_body() {
        let err = decode(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        match err {
            Error::Decode { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn error_envelope_becomes_api_error() {
        let url = Url::parse("https://api-user.e2ro.com/2.2/account").unwrap();
        let body = r#"{"meta":{"code":401,"error":"error.session.invalid"}}"#.to_owned();
        let err = unwrap_envelope(&url, StatusCode::UNAUTHORIZED, body.clone()).unwrap_err();
        assert!(err.is_session_expired());
        match err {
            Error::Api {
                status,
                code,
                payload,
                message,
                ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(code, Some(401));
                assert_eq!(payload, body);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn absolute_paths_bypass_base_url() {
        let session = Session::with_client(
            reqwest::Client::new(),
            Url::parse("https://api-user.e2ro.com").unwrap(),
        );
        assert_eq!(
            session.resolve("/2.2/networks/1").unwrap().as_str(),
            "https://api-user.e2ro.com/2.2/networks/1"
        );
        assert_eq!(
            session.resolve("https://notes.example.com/manifest").unwrap().as_str(),
            "https://notes.example.com/manifest"
        );
    }

    #[test]
    fn poisoned_token_lock_still_reads() {
        let session = std::sync::Arc::new(
            Session::with_client(
                reqwest::Client::new(),
                Url::parse("https://api-user.e2ro.com").unwrap(),
            )
            .with_token(SecretString::from("tok".to_owned())),
        );
        let poisoner = std::sync::Arc::clone(&session);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.token.write().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(session.token.is_poisoned());

        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().expose_secret(), "tok");
        session.set_token(None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::with_client(
            reqwest::Client::new(),
            Url::parse("https://api-user.e2ro.com").unwrap(),
        )
        .with_token(SecretString::from("super-secret".to_owned()));
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("authenticated: true"));
    }
}
