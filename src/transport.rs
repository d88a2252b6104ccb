//! Blocking HTTP backends.
//!
//! A [`Transport`] is the connection a [`GigaChat`](crate::GigaChat) session
//! owns. The session calls [`Transport::close`] exactly once, when it is
//! dropped.

use crate::{Error, Settings};

/// One request header. Sensitive values are hidden from the backend's logs.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    pub name: &'static str,
    pub value: &'a str,
    pub sensitive: bool,
}

impl<'a> Header<'a> {
    pub fn new(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value,
            sensitive: false,
        }
    }

    pub fn sensitive(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value,
            sensitive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built (e.g. a header value is not valid ASCII).
    InvalidRequest(String),
    /// No HTTP response was received.
    Network(String),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
}

pub trait Transport {
    /// POSTs an `application/x-www-form-urlencoded` body and returns the response text.
    fn post_form(
        &self,
        url: &str,
        headers: &[Header<'_>],
        form: &[(&str, &str)],
    ) -> Result<String, TransportError>;

    /// POSTs an `application/json` body and returns the response text.
    fn post_json(
        &self,
        url: &str,
        headers: &[Header<'_>],
        body: &str,
    ) -> Result<String, TransportError>;

    /// Releases the underlying connection. Requests after this fail.
    fn close(&mut self) {}
}

#[cfg(feature = "reqwest")]
pub type DefaultTransport = ReqwestTransport;

#[cfg(all(feature = "ureq", not(feature = "reqwest")))]
pub type DefaultTransport = UreqTransport;

/// Opens the backend selected by the enabled cargo features.
pub fn connect(settings: &Settings) -> Result<DefaultTransport, Error> {
    DefaultTransport::new(settings)
}

fn closed() -> TransportError {
    TransportError::Network("transport is closed".into())
}

#[cfg(feature = "reqwest")]
pub struct ReqwestTransport {
    client: Option<reqwest::blocking::Client>,
}

#[cfg(feature = "reqwest")]
impl ReqwestTransport {
    pub fn new(settings: &Settings) -> Result<ReqwestTransport, Error> {
        let mut builder = reqwest::blocking::ClientBuilder::new()
            .danger_accept_invalid_certs(!settings.verify_ssl_certs);

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::BadConfigurationError(e.to_string()))?;

        Ok(Self {
            client: Some(client),
        })
    }

    fn header_map(headers: &[Header<'_>]) -> Result<reqwest::header::HeaderMap, TransportError> {
        let mut map = reqwest::header::HeaderMap::new();

        for header in headers {
            let invalid = |e: &dyn std::fmt::Display| {
                TransportError::InvalidRequest(format!("{}: {}", header.name, e))
            };
            let name = reqwest::header::HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|e| invalid(&e))?;
            let mut value =
                reqwest::header::HeaderValue::from_str(header.value).map_err(|e| invalid(&e))?;
            value.set_sensitive(header.sensitive);
            map.insert(name, value);
        }

        Ok(map)
    }

    fn send(request: reqwest::blocking::RequestBuilder) -> Result<String, TransportError> {
        let response = request
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
    fn post_form(
        &self,
        url: &str,
        headers: &[Header<'_>],
        form: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let client = self.client.as_ref().ok_or_else(closed)?;
        let request = client.post(url).headers(Self::header_map(headers)?).form(form);

        Self::send(request)
    }

    fn post_json(
        &self,
        url: &str,
        headers: &[Header<'_>],
        body: &str,
    ) -> Result<String, TransportError> {
        let client = self.client.as_ref().ok_or_else(closed)?;
        let request = client
            .post(url)
            .headers(Self::header_map(headers)?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string());

        Self::send(request)
    }

    fn close(&mut self) {
        self.client.take();
    }
}

#[cfg(feature = "ureq")]
pub struct UreqTransport {
    agent: Option<ureq::Agent>,
}

#[cfg(feature = "ureq")]
impl UreqTransport {
    pub fn new(settings: &Settings) -> Result<UreqTransport, Error> {
        let mut builder = ureq::AgentBuilder::new();

        if !settings.verify_ssl_certs {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(|e| Error::BadConfigurationError(e.to_string()))?;
            builder = builder.tls_connector(std::sync::Arc::new(connector));
        }

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            agent: Some(builder.build()),
        })
    }

    fn request(&self, url: &str, headers: &[Header<'_>]) -> Result<ureq::Request, TransportError> {
        let agent = self.agent.as_ref().ok_or_else(closed)?;
        let mut request = agent.post(url);

        for header in headers {
            request = request.set(header.name, header.value);
        }

        Ok(request)
    }

    fn read(result: Result<ureq::Response, ureq::Error>) -> Result<String, TransportError> {
        match result {
            Ok(response) => response
                .into_string()
                .map_err(|e| TransportError::Network(e.to_string())),
            Err(ureq::Error::Status(status, response)) => Err(TransportError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(TransportError::Network(e.to_string())),
        }
    }
}

#[cfg(feature = "ureq")]
impl Transport for UreqTransport {
    fn post_form(
        &self,
        url: &str,
        headers: &[Header<'_>],
        form: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let request = self.request(url, headers)?;

        Self::read(request.send_form(form))
    }

    fn post_json(
        &self,
        url: &str,
        headers: &[Header<'_>],
        body: &str,
    ) -> Result<String, TransportError> {
        let request = self
            .request(url, headers)?
            .set("Content-Type", "application/json");

        Self::read(request.send_string(body))
    }

    fn close(&mut self) {
        self.agent.take();
    }
}

/// In-memory transport that replays scripted responses and records requests.
#[cfg(test)]
pub(crate) mod stub {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::{Header, Transport, TransportError};

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl Recorded {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    #[derive(Clone, Default)]
    pub struct Probe {
        pub requests: Arc<Mutex<Vec<Recorded>>>,
        pub closes: Arc<AtomicUsize>,
    }

    impl Probe {
        pub fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    pub struct StubTransport {
        responses: Mutex<VecDeque<Result<String, TransportError>>>,
        probe: Probe,
    }

    impl StubTransport {
        pub fn new(responses: Vec<Result<String, TransportError>>) -> (Self, Probe) {
            let probe = Probe::default();
            let transport = Self {
                responses: Mutex::new(responses.into()),
                probe: probe.clone(),
            };
            (transport, probe)
        }

        /// Token exchange followed by a chat answer with one choice.
        pub fn answering(content: &str) -> (Self, Probe) {
            Self::new(vec![Ok(token_body("token")), Ok(completion_body(&[content]))])
        }

        fn record(
            &self,
            url: &str,
            headers: &[Header<'_>],
            body: String,
        ) -> Result<String, TransportError> {
            self.probe.requests.lock().unwrap().push(Recorded {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|h| (h.name.to_string(), h.value.to_string()))
                    .collect(),
                body,
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("no scripted response".into())))
        }
    }

    impl Transport for StubTransport {
        fn post_form(
            &self,
            url: &str,
            headers: &[Header<'_>],
            form: &[(&str, &str)],
        ) -> Result<String, TransportError> {
            let body = form
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            self.record(url, headers, body)
        }

        fn post_json(
            &self,
            url: &str,
            headers: &[Header<'_>],
            body: &str,
        ) -> Result<String, TransportError> {
            self.record(url, headers, body.to_string())
        }

        fn close(&mut self) {
            self.probe.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn token_body(token: &str) -> String {
        serde_json::json!({"access_token": token, "expires_at": 1706026848841u64}).to_string()
    }

    pub fn completion_body(contents: &[&str]) -> String {
        let choices: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(index, content)| {
                serde_json::json!({
                    "message": {"role": "assistant", "content": content},
                    "index": index,
                    "finish_reason": "stop"
                })
            })
            .collect();

        serde_json::json!({
            "choices": choices,
            "created": 1706026848,
            "model": "GigaChat:1.0.26.20",
            "object": "chat.completion"
        })
        .to_string()
    }
}
