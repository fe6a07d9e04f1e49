pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod pipeline;
pub mod reconnect;
pub mod record;
pub mod rules;
pub mod store;
pub mod token;
pub mod workers;

pub use cli::{Cli, Commands, RuleAction, cli_parse};
pub use commands::dispatch;
pub use config::{Config, StreamSettings};
pub use error::{Error, Result};
pub use http::{ApiRequest, Auth, Method, Transport, UreqTransport};
pub use pipeline::{StreamEnd, StreamSummary, run_stream};
pub use reconnect::ReconnectPolicy;
pub use rules::{Rule, RuleClient};
pub use store::ArtifactStore;
pub use token::get_token;
