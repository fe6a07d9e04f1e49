use crate::cli::{Commands, RuleAction};
use crate::config::Config;
use crate::events::{EventSink, StreamEvent};
use crate::http::Transport;
use crate::pipeline;
use crate::rules::RuleClient;
use crate::token::get_token;
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;

/// Run one CLI command. Response bodies and the token go to `out`.
pub fn dispatch(
    command: &Commands,
    config: &Config,
    transport: &dyn Transport,
    sink: Arc<dyn EventSink>,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Token => {
            let token = get_token(config, transport).context("Failed to obtain bearer token")?;
            writeln!(out, "{}", token)?;
        }
        Commands::Rule { action } => {
            let token = get_token(config, transport).context("Failed to obtain bearer token")?;
            let client = RuleClient::new(transport, &config.rules_url, &token);
            let body = match action {
                RuleAction::Ls => client.list_rules().context("Failed to list rules")?,
                RuleAction::Rm => client.delete_all_rules().context("Failed to delete rules")?,
                RuleAction::New { query } => client
                    .create_rule(query, &*sink)
                    .context("Failed to create rule")?,
            };
            writeln!(out, "{}", String::from_utf8_lossy(&body))?;
        }
        Commands::Stream => {
            let token = get_token(config, transport).context("Failed to obtain bearer token")?;
            sink.send(StreamEvent::Log("Listening to the stream…".into()));
            pipeline::run_stream(
                transport,
                &config.stream_url,
                &token,
                &config.stream,
                sink.clone(),
            )
            .context("Stream ended with an error")?;
        }
    }
    Ok(())
}
