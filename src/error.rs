use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the API client and the stream pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Error parsing this JSON:\n{payload}\n{source}")]
    Json {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(
        "no credentials: set TWITTER_ACCESS_TOKEN, or both TWITTER_API_KEY and TWITTER_API_SECRET"
    )]
    MissingCredentials,

    #[error("invalid value for {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },

    #[error("output directory '{0}' does not exist")]
    MissingOutputDir(PathBuf),
}

impl Error {
    /// Wrap a JSON decode failure, keeping the offending payload for the diagnostic.
    pub fn json(payload: &[u8], source: serde_json::Error) -> Self {
        Self::Json {
            payload: String::from_utf8_lossy(payload).into_owned(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
