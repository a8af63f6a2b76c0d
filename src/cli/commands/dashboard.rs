use serde_json::json;

use crate::cli::{AppContext, OutputFormat};
use crate::guard::Route;
use crate::view::Dashboard;

pub async fn handle(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.shell.guard().require(Route::Dashboard)?;

    let dashboard = Dashboard::load(&ctx.client).await?;

    match ctx.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "dashboard": dashboard,
                "net": dashboard.net(),
                "links": ctx.shell.links(),
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", ctx.shell.render());
            println!();
            println!("Categories:     {}", dashboard.categories);
            println!("Budget items:   {}", dashboard.items);
            println!("Shared budgets: {}", dashboard.shared);
            println!("Income:         ${}", dashboard.income);
            println!("Expenses:       ${}", dashboard.expense);
            println!("Net:            ${}", dashboard.net());
            println!("Your shares:    ${}", dashboard.shared_amount);
        }
    }
    Ok(())
}
