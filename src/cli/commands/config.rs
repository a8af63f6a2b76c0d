use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{get_config_dir, load_settings, save_settings};
use crate::cli::utils::output_success;
use crate::cli::{AppContext, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show effective settings")]
    Show,

    #[command(about = "Persist the API base URL")]
    SetUrl {
        #[arg(help = "API base URL, e.g. http://localhost:5000")]
        url: String,
    },

    #[command(about = "Check that the API answers")]
    Ping,
}

pub async fn handle(cmd: ConfigCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let dir = get_config_dir(&ctx.config)?;
            match ctx.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "environment": ctx.config.environment,
                        "api_url": ctx.client.base_url().as_str(),
                        "config_dir": dir,
                        "request_timeout_secs": ctx.config.api.request_timeout_secs,
                        "authenticated": ctx.session.is_authenticated(),
                    }))?);
                }
                OutputFormat::Text => {
                    println!("Environment: {:?}", ctx.config.environment);
                    println!("API URL: {}", ctx.client.base_url());
                    println!("Config dir: {}", dir.display());
                    match ctx.config.api.request_timeout_secs {
                        Some(secs) => println!("Request timeout: {}s", secs),
                        None => println!("Request timeout: none"),
                    }
                }
            }
            Ok(())
        }
        ConfigCommands::SetUrl { url } => {
            // Reject garbage before it is persisted
            url::Url::parse(url.trim())
                .map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;

            let mut settings = load_settings(&ctx.config)?;
            settings.set_api_url(&url);
            save_settings(&ctx.config, &settings)?;

            output_success(
                &ctx.output,
                &format!("API URL set to {}", settings.api_url.as_deref().unwrap_or_default()),
                Some(json!({ "api_url": settings.api_url })),
            )
        }
        ConfigCommands::Ping => {
            let started = std::time::Instant::now();
            let message = ctx.client.ping().await?;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            output_success(
                &ctx.output,
                &format!("{} responded in {}ms: {}", ctx.client.base_url(), elapsed_ms, message),
                Some(json!({ "status": "up", "elapsed_ms": elapsed_ms, "message": message })),
            )
        }
    }
}
