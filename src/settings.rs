use std::env;
use std::time::Duration;

use crate::{Error, Secret, DEFAULT_AUTH_URL, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SCOPE};

const GIGACHAT_BASE_URL: &str = "GIGACHAT_BASE_URL";
const GIGACHAT_AUTH_URL: &str = "GIGACHAT_AUTH_URL";
const GIGACHAT_CREDENTIALS: &str = "GIGACHAT_CREDENTIALS";
const GIGACHAT_ACCESS_TOKEN: &str = "GIGACHAT_ACCESS_TOKEN";
const GIGACHAT_SCOPE: &str = "GIGACHAT_SCOPE";
const GIGACHAT_MODEL: &str = "GIGACHAT_MODEL";
const GIGACHAT_VERIFY_SSL_CERTS: &str = "GIGACHAT_VERIFY_SSL_CERTS";
const GIGACHAT_TIMEOUT: &str = "GIGACHAT_TIMEOUT";

/// Configuration of one GigaChat session.
///
/// Construct it with struct update syntax:
///
/// ```rust
/// let settings = gigachat_roadmap::Settings {
///     credentials: Some("base64-authorization-key".into()),
///     verify_ssl_certs: false,
///     ..Default::default()
/// };
/// assert_eq!(settings.scope, "GIGACHAT_API_PERS");
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    /// Chat API base, without the trailing `/chat/completions`.
    pub base_url: String,
    pub auth_url: String,
    /// Authorization key sent as `Basic` to the OAuth endpoint.
    pub credentials: Option<Secret>,
    /// Pre-issued access token. When set, the OAuth exchange is skipped.
    pub access_token: Option<Secret>,
    pub scope: String,
    pub model: String,
    pub verify_ssl_certs: bool,
    /// `None` keeps the HTTP backend's own default.
    pub timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            auth_url: DEFAULT_AUTH_URL.into(),
            credentials: None,
            access_token: None,
            scope: DEFAULT_SCOPE.into(),
            model: DEFAULT_MODEL.into(),
            verify_ssl_certs: true,
            timeout: None,
        }
    }
}

impl Settings {
    /// Builds settings from the `GIGACHAT_*` environment variables.
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_environment() -> Result<Settings, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Settings, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut settings = Settings::default();

        if let Some(base_url) = get(GIGACHAT_BASE_URL) {
            settings.base_url = base_url;
        }
        if let Some(auth_url) = get(GIGACHAT_AUTH_URL) {
            settings.auth_url = auth_url;
        }
        settings.credentials = get(GIGACHAT_CREDENTIALS).map(Secret::from);
        settings.access_token = get(GIGACHAT_ACCESS_TOKEN).map(Secret::from);
        if let Some(scope) = get(GIGACHAT_SCOPE) {
            settings.scope = scope;
        }
        if let Some(model) = get(GIGACHAT_MODEL) {
            settings.model = model;
        }
        if let Some(verify) = get(GIGACHAT_VERIFY_SSL_CERTS) {
            settings.verify_ssl_certs = parse_bool(&verify).ok_or_else(|| {
                Error::BadConfigurationError(format!(
                    "{GIGACHAT_VERIFY_SSL_CERTS} must be a boolean, got {verify:?}"
                ))
            })?;
        }
        if let Some(timeout) = get(GIGACHAT_TIMEOUT) {
            let seconds: f64 = timeout.parse().map_err(|_| {
                Error::BadConfigurationError(format!(
                    "{GIGACHAT_TIMEOUT} must be a number of seconds, got {timeout:?}"
                ))
            })?;
            let timeout = Duration::try_from_secs_f64(seconds)
                .map_err(|e| Error::BadConfigurationError(e.to_string()))?;
            settings.timeout = Some(timeout);
        }

        Ok(settings)
    }

    /// Checks what a session needs before it can talk to the service.
    pub fn validate(&self) -> Result<(), Error> {
        if self.base_url.is_empty() {
            return Err(Error::BadConfigurationError("No base URL given".into()));
        }

        if self.access_token.is_none() {
            if self.auth_url.is_empty() {
                return Err(Error::BadConfigurationError("No auth URL given".into()));
            }
            if self.credentials.is_none() {
                return Err(Error::BadConfigurationError(
                    "Missing credentials or access token".into(),
                ));
            }
        }

        Ok(())
    }

    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
