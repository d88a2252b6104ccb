use tracing::{debug, warn};

use crate::transport::{self, DefaultTransport, Header, Transport, TransportError};
use crate::{AccessToken, Chat, ChatCompletion, Error, Settings};

/// A scoped session with the GigaChat service.
///
/// The session owns its transport and closes it exactly once when dropped,
/// whether the calls made through it succeeded or not. An access token is
/// requested on first use and kept for the lifetime of the session.
pub struct GigaChat<T: Transport = DefaultTransport> {
    settings: Settings,
    transport: T,
    token: Option<AccessToken>,
}

impl GigaChat<DefaultTransport> {
    /// Opens a session over the HTTP backend selected by the enabled features.
    ///
    /// # Arguments
    ///
    /// * `settings`: Endpoints, credentials and certificate policy of the session.
    ///
    /// # Returns
    ///
    /// The open session, or a `BadConfigurationError` if the settings are
    /// incomplete or the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use gigachat_roadmap::{Chat, GigaChat, Message, Settings};
    ///
    /// let mut session = GigaChat::new(Settings {
    ///     credentials: Some("base64-authorization-key".into()),
    ///     ..Default::default()
    /// })?;
    ///
    /// let chat = Chat {
    ///     messages: vec![Message::user("Hello!")],
    ///     ..Default::default()
    /// };
    /// let response = session.chat(&chat)?;
    /// println!("{}", response.into_first_content()?);
    /// # Ok::<(), gigachat_roadmap::Error>(())
    /// ```
    pub fn new(settings: Settings) -> Result<Self, Error> {
        settings.validate()?;
        let transport = transport::connect(&settings)?;

        Self::with_transport(settings, transport)
    }
}

impl<T: Transport> GigaChat<T> {
    /// Opens a session over a caller-supplied transport.
    ///
    /// The transport belongs to the session from here on, so it is closed even
    /// when the settings turn out to be invalid.
    ///
    /// # Arguments
    ///
    /// * `settings`: Endpoints and credentials of the session.
    /// * `transport`: The connection requests are sent through.
    ///
    /// # Returns
    ///
    /// The open session, or a `BadConfigurationError` if the settings are
    /// incomplete.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use gigachat_roadmap::{transport, GigaChat, Settings};
    ///
    /// let settings = Settings {
    ///     credentials: Some("base64-authorization-key".into()),
    ///     verify_ssl_certs: false,
    ///     ..Default::default()
    /// };
    /// let transport = transport::connect(&settings)?;
    /// let _session = GigaChat::with_transport(settings, transport)?;
    /// # Ok::<(), gigachat_roadmap::Error>(())
    /// ```
    pub fn with_transport(settings: Settings, transport: T) -> Result<Self, Error> {
        let token = settings.access_token.clone().map(|access_token| AccessToken {
            access_token,
            expires_at: 0,
        });
        let session = Self {
            settings,
            transport,
            token,
        };

        session.settings.validate()?;
        debug!(base_url = %session.settings.base_url, "opened GigaChat session");

        Ok(session)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Exchanges the credentials for an access token, unless the session
    /// already has one.
    ///
    /// Sends the authorization key as `Basic` credentials together with a fresh
    /// `RqUID` and the configured scope.
    ///
    /// # Returns
    ///
    /// The session's token. A network failure or malformed reply gives a
    /// `ConnectionError`, a rejected key an `AuthenticationError`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use gigachat_roadmap::{GigaChat, Settings};
    ///
    /// let mut session = GigaChat::new(Settings {
    ///     credentials: Some("base64-authorization-key".into()),
    ///     ..Default::default()
    /// })?;
    /// let token = session.authenticate()?;
    /// println!("token expires at {}", token.expires_at);
    /// # Ok::<(), gigachat_roadmap::Error>(())
    /// ```
    pub fn authenticate(&mut self) -> Result<&AccessToken, Error> {
        if self.token.is_none() {
            self.token = Some(self.request_token()?);
        }

        self.token
            .as_ref()
            .ok_or_else(|| Error::ConnectionError("no access token".into()))
    }

    fn request_token(&self) -> Result<AccessToken, Error> {
        let credentials = self
            .settings
            .credentials
            .as_ref()
            .ok_or_else(|| Error::BadConfigurationError("Missing credentials".into()))?;
        let authorization = format!("Basic {}", credentials.expose());
        let rq_uid = uuid::Uuid::new_v4().to_string();
        let headers = [
            Header::sensitive("Authorization", &authorization),
            Header::new("RqUID", &rq_uid),
            Header::new("Accept", "application/json"),
        ];

        debug!(url = %self.settings.auth_url, scope = %self.settings.scope, "requesting access token");

        let body = self
            .transport
            .post_form(
                &self.settings.auth_url,
                &headers,
                &[("scope", self.settings.scope.as_str())],
            )
            .map_err(|e| match e {
                TransportError::Status { status, body } => {
                    warn!(status, "authorization rejected");
                    Error::AuthenticationError {
                        status,
                        message: body,
                    }
                }
                TransportError::Network(message) | TransportError::InvalidRequest(message) => {
                    Error::ConnectionError(message)
                }
            })?;

        serde_json::from_str(&body)
            .map_err(|e| Error::ConnectionError(format!("malformed token response: {e}")))
    }

    /// Sends a chat completions request.
    ///
    /// Authenticates first if the session has no token yet.
    ///
    /// # Arguments
    ///
    /// * `chat`: The request, including model and messages.
    ///
    /// # Returns
    ///
    /// The parsed completion. Failures of the call itself are `NetworkError`,
    /// `ApiError` or `DeserializationError`; authentication failures are
    /// reported as by [`GigaChat::authenticate`].
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use gigachat_roadmap::{Chat, GigaChat, Message, Settings};
    ///
    /// let mut session = GigaChat::new(Settings {
    ///     access_token: Some("pre-issued-token".into()),
    ///     ..Default::default()
    /// })?;
    /// let chat = Chat {
    ///     messages: vec![Message::user("Who are you?")],
    ///     max_tokens: Some(64),
    ///     ..Default::default()
    /// };
    /// for choice in session.chat(&chat)?.choices {
    ///     println!("{}", choice.message.content);
    /// }
    /// # Ok::<(), gigachat_roadmap::Error>(())
    /// ```
    pub fn chat(&mut self, chat: &Chat) -> Result<ChatCompletion, Error> {
        let authorization = format!("Bearer {}", self.authenticate()?.access_token.expose());
        let body = serde_json::to_string(chat).map_err(Error::SerializationError)?;
        let url = self.settings.chat_url();
        let headers = [
            Header::sensitive("Authorization", &authorization),
            Header::new("Accept", "application/json"),
        ];

        debug!(model = %chat.model, messages = chat.messages.len(), "sending chat request");

        let response = self
            .transport
            .post_json(&url, &headers, &body)
            .map_err(|e| match e {
                TransportError::Status { status, body } => {
                    warn!(status, "chat request failed");
                    Error::ApiError {
                        status,
                        message: body,
                    }
                }
                TransportError::Network(message) | TransportError::InvalidRequest(message) => {
                    Error::NetworkError(message)
                }
            })?;

        let completion: ChatCompletion =
            serde_json::from_str(&response).map_err(Error::DeserializationError)?;
        debug!(choices = completion.choices.len(), model = %completion.model, "received chat response");

        Ok(completion)
    }
}

impl<T: Transport> Drop for GigaChat<T> {
    fn drop(&mut self) {
        self.transport.close();
        debug!("closed GigaChat session");
    }
}
