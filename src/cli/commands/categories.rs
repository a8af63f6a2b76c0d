use clap::Subcommand;

use super::inline_error;
use crate::cli::utils::{output_collection, output_success};
use crate::cli::AppContext;
use crate::guard::Route;
use crate::models::{Category, CategoryForm};
use crate::view::{self, CategoriesView};

#[derive(Subcommand)]
pub enum CategoryCommands {
    #[command(about = "List categories")]
    List,

    #[command(about = "Create a category")]
    Add {
        #[arg(help = "Category name")]
        name: String,
    },

    #[command(about = "Rename a category")]
    Rename {
        #[arg(help = "Category ID")]
        id: i64,
        #[arg(help = "New name")]
        name: String,
    },

    #[command(about = "Delete a category")]
    Delete {
        #[arg(help = "Category ID")]
        id: i64,
    },
}

pub async fn handle(cmd: CategoryCommands, ctx: &AppContext) -> anyhow::Result<()> {
    ctx.shell.guard().require(Route::Categories)?;

    let view = view::categories(&ctx.client);
    view.mount().await.map_err(|e| inline_error(view.error(), e))?;

    match cmd {
        CategoryCommands::List => {}
        CategoryCommands::Add { name } => {
            view.create(&CategoryForm::new(name.clone()))
                .await
                .map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Category '{}' created", name.trim()), None)?;
        }
        CategoryCommands::Rename { id, name } => {
            view.update(id, &CategoryForm::new(name.clone()))
                .await
                .map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Category {} renamed to '{}'", id, name.trim()), None)?;
        }
        CategoryCommands::Delete { id } => {
            view.delete(id).await.map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Category {} deleted", id), None)?;
        }
    }

    print(&view, ctx)
}

fn print(view: &CategoriesView, ctx: &AppContext) -> anyhow::Result<()> {
    output_collection(
        &ctx.output,
        "categories",
        "Categories:",
        &view.items(),
        |c: &Category| format!("#{} {}", c.id, c.name),
    )
}
