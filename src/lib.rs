//! Blocking GigaChat client that turns a prompt into a learning roadmap.
//!
//! The main entry point is [`generate_roadmap`], which opens a session, sends
//! one user message and returns the text of the first choice.

#[cfg(not(any(feature = "reqwest", feature = "ureq")))]
compile_error!("One of the features 'reqwest' and 'ureq' must be enabled.");

mod client;
mod error;
mod models;
pub mod prompt;
mod settings;
pub mod store;
pub mod transport;

pub use client::GigaChat;
pub use error::{Error, ErrorKind};
pub use models::{AccessToken, Chat, ChatCompletion, Choice, Message, Role, Secret, Usage};
pub use prompt::RoadmapPrompt;
pub use settings::Settings;
pub use store::{Roadmap, RoadmapStore};
pub use transport::Transport;

pub const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const DEFAULT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_MODEL: &str = "GigaChat";
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";

/// Sends `prompt` to GigaChat and returns the first choice's text unchanged.
///
/// `credential` is the authorization key issued for the `GIGACHAT_API_PERS`
/// scope. It is only used for this call. Certificates are verified; use
/// [`generate_roadmap_with`] and [`Settings::verify_ssl_certs`] to connect to
/// an endpoint whose certificate chain is not in the system store.
///
/// # Arguments
///
/// * `prompt`: Text sent as the single user message, unvalidated.
/// * `credential`: Authorization key, used for this call only.
///
/// # Returns
///
/// The first choice's content. Session setup failures are
/// [`ErrorKind::Connection`] errors, failures of the chat call itself
/// (including a response without choices) are [`ErrorKind::Service`] errors.
///
/// # Example
///
/// ```rust,no_run
/// let html = gigachat_roadmap::generate_roadmap("Roadmap for Rust", "base64-authorization-key")?;
/// println!("{html}");
/// # Ok::<(), gigachat_roadmap::Error>(())
/// ```
pub fn generate_roadmap(prompt: &str, credential: &str) -> Result<String, Error> {
    let settings = Settings {
        credentials: Some(credential.into()),
        ..Default::default()
    };

    generate_roadmap_with(GigaChat::new(settings)?, prompt)
}

/// Same as [`generate_roadmap`] over an already configured session.
///
/// The session is consumed and closed before this returns, on success and on
/// error alike.
///
/// # Arguments
///
/// * `session`: An opened session; its configured model is used.
/// * `prompt`: Text sent as the single user message.
///
/// # Example
///
/// ```rust,no_run
/// use gigachat_roadmap::{generate_roadmap_with, GigaChat, Settings};
///
/// let session = GigaChat::new(Settings {
///     credentials: Some("base64-authorization-key".into()),
///     verify_ssl_certs: false,
///     ..Default::default()
/// })?;
/// let html = generate_roadmap_with(session, "Roadmap for Rust")?;
/// # Ok::<(), gigachat_roadmap::Error>(())
/// ```
pub fn generate_roadmap_with<T: Transport>(
    mut session: GigaChat<T>,
    prompt: &str,
) -> Result<String, Error> {
    let chat = Chat {
        model: session.settings().model.clone(),
        messages: vec![Message::user(prompt)],
        ..Default::default()
    };

    session.chat(&chat)?.into_first_content()
}
