use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, prompt_secret};
use crate::cli::{AppContext, OutputFormat};
use crate::guard::Route;
use crate::models::{Credentials, Registration};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the budget API")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Register a new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Log in right after registering")]
        login: bool,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Follow session changes made by other processes until interrupted")]
    Watch,
}

pub async fn handle(cmd: AuthCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_secret("Password")?,
            };
            let credentials = Credentials::new(username, password);
            ctx.client.login(&credentials).await?;

            output_success(
                &ctx.output,
                &format!("Logged in as {}", credentials.username.trim()),
                Some(json!({ "redirect": Route::Dashboard.path() })),
            )
        }
        AuthCommands::Register { username, password, login } => {
            let password = match password {
                Some(p) => p,
                None => prompt_secret("Password")?,
            };
            let credentials = Credentials::new(username, password);

            match ctx.client.register(&credentials).await? {
                Registration::SignedIn => output_success(
                    &ctx.output,
                    &format!("Registered and logged in as {}", credentials.username.trim()),
                    Some(json!({ "redirect": Route::Dashboard.path() })),
                ),
                Registration::Registered if login => {
                    ctx.client.login(&credentials).await?;
                    output_success(
                        &ctx.output,
                        &format!("Registered and logged in as {}", credentials.username.trim()),
                        Some(json!({ "redirect": Route::Dashboard.path() })),
                    )
                }
                Registration::Registered => output_success(
                    &ctx.output,
                    "Registered. Log in with `budget auth login`",
                    Some(json!({ "redirect": Route::Login.path() })),
                ),
            }
        }
        AuthCommands::Logout => {
            let landing = ctx.shell.logout()?;
            output_success(
                &ctx.output,
                "Logged out",
                Some(json!({ "redirect": landing.path() })),
            )
        }
        AuthCommands::Status => status(ctx),
        AuthCommands::Watch => watch(ctx).await,
    }
}

fn status(ctx: &AppContext) -> anyhow::Result<()> {
    let state = ctx.shell.auth_state();
    let claims = ctx.session.claims();

    let subject = claims.as_ref().and_then(|c| c.subject());
    let expires_at = claims.as_ref().and_then(|c| c.expires_at());

    match ctx.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "state": state,
                "api_url": ctx.client.base_url().as_str(),
                "subject": subject,
                "expires_at": expires_at,
            }))?);
        }
        OutputFormat::Text => {
            println!("Status: {:?}", state);
            println!("API: {}", ctx.client.base_url());
            if let Some(subject) = subject {
                println!("User id: {}", subject);
            }
            if let Some(expires_at) = expires_at {
                // Informational only; the API decides whether the token is still good
                let note = if expires_at <= chrono::Utc::now() { " (expired)" } else { "" };
                println!("Token expires: {}{}", expires_at.to_rfc3339(), note);
            }
            println!("{}", ctx.shell.render());
        }
    }
    Ok(())
}

async fn watch(ctx: &AppContext) -> anyhow::Result<()> {
    let poller = ctx.session.watch_storage(ctx.config.session.watch_interval());
    let mut rx = ctx.session.subscribe();

    output_success(&ctx.output, &format!("Watching session ({:?})", ctx.shell.auth_state()), None)?;

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                let message = if state.token.is_some() { "Logged in elsewhere" } else { "Logged out elsewhere" };
                output_success(
                    &ctx.output,
                    message,
                    Some(json!({ "generation": state.generation, "authenticated": state.token.is_some() })),
                )?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.abort();
    Ok(())
}
