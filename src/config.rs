use crate::error::{Error, Result};
use crate::reconnect::ReconnectPolicy;
use std::path::PathBuf;

pub const DEFAULT_TOKEN_URL: &str = "https://api.twitter.com/oauth2/token";
pub const DEFAULT_RULES_URL: &str = "https://api.twitter.com/2/tweets/search/stream/rules";
pub const DEFAULT_STREAM_URL: &str = "https://api.twitter.com/2/tweets/search/stream";

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Sent as the User-Agent when set.
    pub app_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Pre-issued bearer token. Skips the client-credentials exchange.
    pub access_token: Option<String>,
    pub token_url: String,
    pub rules_url: String,
    pub stream_url: String,
    pub stream: StreamSettings,
}

/// Settings for the `stream` command.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Directory that receives one `<id>.json` per event. Must already exist.
    pub output_dir: PathBuf,
    /// Number of persist worker threads.
    pub workers: usize,
    /// Records that may wait for a worker before the read loop blocks.
    pub queue_capacity: usize,
    pub reconnect: ReconnectPolicy,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            workers: 4,
            queue_capacity: 1024,
            reconnect: ReconnectPolicy::disabled(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut stream = StreamSettings::default();
        if let Some(dir) = get("TWITTER_STREAM_DIR") {
            stream.output_dir = PathBuf::from(dir);
        }
        if let Some(v) = get("TWITTER_STREAM_WORKERS") {
            stream.workers = parse_positive("TWITTER_STREAM_WORKERS", &v)?;
        }
        if let Some(v) = get("TWITTER_STREAM_QUEUE") {
            stream.queue_capacity = parse_positive("TWITTER_STREAM_QUEUE", &v)?;
        }
        if let Some(v) = get("TWITTER_STREAM_RECONNECTS") {
            let attempts = v.parse().map_err(|_| Error::InvalidSetting {
                name: "TWITTER_STREAM_RECONNECTS",
                value: v.clone(),
            })?;
            stream.reconnect = ReconnectPolicy::with_attempts(attempts);
        }

        Ok(Self {
            app_name: get("TWITTER_APP_NAME"),
            api_key: get("TWITTER_API_KEY"),
            api_secret: get("TWITTER_API_SECRET"),
            access_token: get("TWITTER_ACCESS_TOKEN"),
            token_url: get("TWITTER_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            rules_url: get("TWITTER_RULES_URL").unwrap_or_else(|| DEFAULT_RULES_URL.into()),
            stream_url: get("TWITTER_STREAM_URL").unwrap_or_else(|| DEFAULT_STREAM_URL.into()),
            stream,
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidSetting {
            name,
            value: value.to_string(),
        }),
    }
}
