use std::fmt;

use crate::{Error, DEFAULT_MODEL};

/// A secret string (authorization key or access token).
///
/// The value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
    /// Any role the service reports that this crate does not know.
    /// Only produced when reading responses, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

// NOTE: Optional sampling fields are only sent when set, so the service
// applies its own defaults for everything else.

/// Chat completions request.
///
/// ```rust
/// let chat = gigachat_roadmap::Chat {
///     messages: vec![gigachat_roadmap::Message::user("Hello")],
///     ..Default::default()
/// };
/// assert_eq!(chat.model, "GigaChat");
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct Chat {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    /// Always `false`: only non-streaming completions are supported.
    #[serde(skip_serializing_if = "is_false")]
    pub stream: bool,
}

impl Default for Chat {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            messages: Vec::new(),
            temperature: None,
            top_p: None,
            n: None,
            max_tokens: None,
            repetition_penalty: None,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Choice {
    pub message: Message,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Consumes the completion and returns the first choice's text as is.
    pub fn into_first_content(self) -> Result<String, Error> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(Error::NoChoicesError)
    }
}

/// Token issued by the OAuth endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AccessToken {
    pub access_token: Secret,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: u64,
}
