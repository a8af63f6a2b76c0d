pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{FileStorage, Session, SessionStore};
use crate::shell::NavShell;

#[derive(Parser)]
#[command(name = "budget")]
#[command(about = "Budget Tracker CLI - categories, income/expense items and shared contributions")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Budget API base URL (overrides saved settings)")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, registration and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Open a client route, applying the login guard")]
    Open {
        #[arg(help = "Route path, e.g. /items")]
        path: String,
    },

    #[command(about = "Show totals across categories, items and shared budgets")]
    Dashboard,

    #[command(about = "Manage spending categories")]
    Categories {
        #[command(subcommand)]
        cmd: commands::categories::CategoryCommands,
    },

    #[command(about = "Manage income and expense items")]
    Items {
        #[command(subcommand)]
        cmd: commands::items::ItemCommands,
    },

    #[command(about = "Manage shared contributions to budget items")]
    Shared {
        #[command(subcommand)]
        cmd: commands::shared::SharedCommands,
    },

    #[command(about = "CLI settings and API connectivity")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command handler needs, built once per invocation
pub struct AppContext {
    pub config: ClientConfig,
    pub session: Session,
    pub client: ApiClient,
    pub shell: NavShell,
    pub output: OutputFormat,
}

impl AppContext {
    pub fn new(config: ClientConfig, api_url: Option<&str>, output: OutputFormat) -> anyhow::Result<Self> {
        let dir = config::get_config_dir(&config)?;
        let settings = config::load_settings(&config)?;

        let session = SessionStore::shared(Box::new(FileStorage::in_dir(&dir)))?;
        let base_url = config::resolve_api_url(api_url, &settings, &config);
        let client = ApiClient::new(&config.api, session.clone())?.with_base_url(&base_url)?;
        let shell = NavShell::new(session.clone());

        tracing::debug!(api = %client.base_url(), config_dir = %dir.display(), "context ready");

        Ok(Self {
            config,
            session,
            client,
            shell,
            output,
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = AppContext::new(crate::config::config().clone(), cli.api_url.as_deref(), output_format.clone())?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Open { path } => commands::open::handle(&path, &ctx).await,
        Commands::Dashboard => commands::dashboard::handle(&ctx).await,
        Commands::Categories { cmd } => commands::categories::handle(cmd, &ctx).await,
        Commands::Items { cmd } => commands::items::handle(cmd, &ctx).await,
        Commands::Shared { cmd } => commands::shared::handle(cmd, &ctx).await,
        Commands::Config { cmd } => commands::config::handle(cmd, &ctx).await,
    };

    // JSON consumers get the structured error on stdout as well
    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        if let Some(client_err) = e.downcast_ref::<ClientError>() {
            utils::output_client_error(&output_format, client_err)?;
        }
    }

    result
}
