use clap::Subcommand;

use super::inline_error;
use crate::cli::utils::{output_collection, output_success};
use crate::cli::AppContext;
use crate::error::ClientError;
use crate::guard::Route;
use crate::models::{BudgetItem, ItemForm};
use crate::view::{self, ItemsView};

#[derive(Subcommand)]
pub enum ItemCommands {
    #[command(about = "List budget items")]
    List,

    #[command(about = "Add an income or expense item")]
    Add {
        #[arg(long, help = "Item title")]
        title: String,
        #[arg(long, help = "Amount, e.g. 1200 or 45.50")]
        amount: String,
        #[arg(long = "type", help = "income or expense")]
        kind: String,
        #[arg(long, help = "Category ID")]
        category: String,
    },

    #[command(about = "Update an item; omitted fields keep their current value")]
    Update {
        #[arg(help = "Item ID")]
        id: i64,
        #[arg(long, help = "Item title")]
        title: Option<String>,
        #[arg(long, help = "Amount")]
        amount: Option<String>,
        #[arg(long = "type", help = "income or expense")]
        kind: Option<String>,
        #[arg(long, help = "Category ID; looked up by the item's category name when omitted")]
        category: Option<String>,
    },

    #[command(about = "Delete an item")]
    Delete {
        #[arg(help = "Item ID")]
        id: i64,
    },
}

pub async fn handle(cmd: ItemCommands, ctx: &AppContext) -> anyhow::Result<()> {
    ctx.shell.guard().require(Route::Items)?;

    let view = view::items(&ctx.client);
    view.mount().await.map_err(|e| inline_error(view.error(), e))?;

    match cmd {
        ItemCommands::List => {}
        ItemCommands::Add { title, amount, kind, category } => {
            let form = ItemForm {
                title,
                amount,
                kind,
                category_id: category,
            };
            view.create(&form).await.map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Item '{}' added", form.title.trim()), None)?;
        }
        ItemCommands::Update { id, title, amount, kind, category } => {
            let current = view
                .find(id)
                .ok_or_else(|| ClientError::field("id", format!("No item with id {}", id)))?;

            let category_id = match category.or_else(|| current.category_id.map(|c| c.to_string())) {
                Some(id) => id,
                None => category_id_by_name(ctx, current.category.as_deref()).await?,
            };

            let form = ItemForm {
                title: title.unwrap_or_else(|| current.title.clone()),
                amount: amount.unwrap_or_else(|| current.amount.0.to_string()),
                kind: kind.unwrap_or_else(|| current.kind.to_string()),
                category_id,
            };
            view.update(id, &form).await.map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Item {} updated", id), None)?;
        }
        ItemCommands::Delete { id } => {
            view.delete(id).await.map_err(|e| inline_error(view.error(), e))?;
            output_success(&ctx.output, &format!("Item {} deleted", id), None)?;
        }
    }

    print(&view, ctx)
}

// Item rows may carry only the category name
async fn category_id_by_name(ctx: &AppContext, name: Option<&str>) -> anyhow::Result<String> {
    let Some(name) = name else {
        return Ok(String::new());
    };

    let categories = view::categories(&ctx.client);
    categories
        .mount()
        .await
        .map_err(|e| inline_error(categories.error(), e))?;

    Ok(categories
        .items()
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.id.to_string())
        .unwrap_or_default())
}

pub fn render_item(item: &BudgetItem) -> String {
    let category = item
        .category
        .clone()
        .or_else(|| item.category_id.map(|id| format!("category #{}", id)))
        .unwrap_or_else(|| "uncategorized".to_string());
    format!("#{} {} - ${} ({}) in {}", item.id, item.title, item.amount, item.kind, category)
}

fn print(view: &ItemsView, ctx: &AppContext) -> anyhow::Result<()> {
    output_collection(&ctx.output, "items", "Budget Items:", &view.items(), render_item)
}
