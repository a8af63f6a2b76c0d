use clap::Parser;
use tracing_subscriber::EnvFilter;

use budget_tracker::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so BUDGET_API_URL and friends apply to cargo run
    let _ = dotenvy::dotenv();

    let config = budget_tracker::config::config();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(budget_tracker::is_development!())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = budget_tracker::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
