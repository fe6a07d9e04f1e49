use clap::{Parser, Subcommand};

/// Twitter Filtered Stream API client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Tools to manage the filter rules
    Rule {
        #[command(subcommand)]
        action: RuleAction,
    },
    /// Start streaming with current rules
    Stream,
    /// Show API bearer token
    Token,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RuleAction {
    /// List the existing rules
    Ls,
    /// Remove existing rules
    Rm,
    /// Create a rule
    New {
        /// Text for the rule
        #[arg(long)]
        query: String,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
