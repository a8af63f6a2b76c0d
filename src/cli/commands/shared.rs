use clap::Subcommand;

use super::inline_error;
use crate::cli::utils::{output_collection, output_success};
use crate::cli::AppContext;
use crate::guard::Route;
use crate::models::{Form, ShareForm, SharedContribution};
use crate::view::{self, SharedView};

#[derive(Subcommand)]
pub enum SharedCommands {
    #[command(about = "List your shared contributions")]
    List,

    #[command(about = "Contribute a percentage of a budget item")]
    Add {
        #[arg(long, help = "Budget item ID")]
        item: Option<String>,
        #[arg(long, help = "Contribution percent, 1 to 100")]
        percent: Option<String>,
    },

    #[command(about = "Remove a shared contribution")]
    Delete {
        #[arg(help = "Shared contribution ID")]
        id: i64,
    },
}

pub async fn handle(cmd: SharedCommands, ctx: &AppContext) -> anyhow::Result<()> {
    ctx.shell.guard().require(Route::Shared)?;

    let view = view::shared(&ctx.client);

    match cmd {
        SharedCommands::List => {
            view.mount().await.map_err(|e| inline_error(view.error(), e))?;
        }
        SharedCommands::Add { item, percent } => {
            let form = ShareForm::new(item.unwrap_or_default(), percent.unwrap_or_default());
            // Invalid input stops here, before the view touches the network
            form.validate()?;
            view.mount().await.map_err(|e| inline_error(view.error(), e))?;
            view.create(&form).await.map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, "Shared budget added", None)?;
        }
        SharedCommands::Delete { id } => {
            view.mount().await.map_err(|e| inline_error(view.error(), e))?;
            view.delete(id).await.map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Shared contribution {} removed", id), None)?;
        }
    }

    print(&view, ctx)
}

fn print(view: &SharedView, ctx: &AppContext) -> anyhow::Result<()> {
    output_collection(
        &ctx.output,
        "shared",
        "Your Shared Contributions:",
        &view.items(),
        |s: &SharedContribution| {
            format!(
                "#{} {} ({}) - you contribute {}% = ${}",
                s.id,
                s.item,
                s.kind,
                s.contribution_percent.normalize(),
                s.amount
            )
        },
    )
}
