use crate::error::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use std::io::Read;
use std::time::Duration;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic, used only for the token exchange.
    Basic { user: String, password: String },
    Bearer(String),
}

impl Auth {
    pub fn header_value(&self) -> String {
        match self {
            Auth::Basic { user, password } => {
                format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
            }
            Auth::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

/// A single request/response call against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub auth: Auth,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn get(url: &str, token: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            auth: Auth::Bearer(token.to_string()),
            content_type: JSON_CONTENT_TYPE,
            body: Vec::new(),
        }
    }

    pub fn post_json<T: Serialize>(url: &str, token: &str, body: &T) -> Result<Self> {
        let body = serde_json::to_vec(body).map_err(|e| Error::json(b"", e))?;
        Ok(Self {
            method: Method::Post,
            url: url.to_string(),
            auth: Auth::Bearer(token.to_string()),
            content_type: JSON_CONTENT_TYPE,
            body,
        })
    }

    pub fn post_form(url: &str, auth: Auth, body: &str) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            auth,
            content_type: FORM_CONTENT_TYPE,
            body: body.as_bytes().to_vec(),
        }
    }

    /// The body as text, for logging.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The HTTP collaborator behind the token, rule and stream operations.
pub trait Transport {
    /// Send `request` and return the full response body. Non-2xx statuses are errors.
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>>;

    /// Open the long-lived stream and return its body as an incremental reader.
    fn open_stream(&self, url: &str, token: &str) -> Result<Box<dyn Read>>;
}

/// `Transport` backed by a blocking `ureq` agent.
pub struct UreqTransport {
    /// Short-lived API calls.
    agent: ureq::Agent,
    /// The stream connection, which has no timeout.
    stream_agent: ureq::Agent,
    user_agent: Option<String>,
}

impl UreqTransport {
    pub fn new(user_agent: Option<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .new_agent();
        let stream_agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            stream_agent,
            user_agent,
        }
    }

    fn decorate<B>(&self, builder: ureq::RequestBuilder<B>, auth: &Auth) -> ureq::RequestBuilder<B> {
        let builder = builder.header("Authorization", auth.header_value());
        match &self.user_agent {
            Some(name) => builder.header("User-Agent", name.as_str()),
            None => builder,
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let url = request.url.as_str();
        let result = match request.method {
            Method::Get => self
                .decorate(self.agent.get(url), &request.auth)
                .header("Content-Type", request.content_type)
                .call(),
            Method::Post => self
                .decorate(self.agent.post(url), &request.auth)
                .header("Content-Type", request.content_type)
                .send(request.body.as_slice()),
        };
        let resp = result.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        let mut body = Vec::new();
        resp.into_body().into_reader().read_to_end(&mut body)?;

        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    fn open_stream(&self, url: &str, token: &str) -> Result<Box<dyn Read>> {
        let resp = self
            .decorate(self.stream_agent.get(url), &Auth::Bearer(token.to_string()))
            .header("Content-Type", JSON_CONTENT_TYPE)
            .call()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        let mut reader = resp.into_body().into_reader();
        if !status.is_success() {
            let mut body = Vec::new();
            reader.read_to_end(&mut body)?;
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(Box::new(reader))
    }
}
