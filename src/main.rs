use filtered_stream::events::ConsoleSink;
use filtered_stream::{Config, UreqTransport, cli_parse, dispatch};

fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the real environment still applies.
    dotenv::dotenv().ok();

    let cli = cli_parse();
    let config = Config::from_env()?;
    let transport = UreqTransport::new(config.app_name.clone());
    let sink = ConsoleSink::new();

    // Response bodies and the token only; progress goes to stderr via the sink.
    let mut out = std::io::stdout();
    dispatch(&cli.command, &config, &transport, sink, &mut out)
}
