use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::AppContext;
use crate::guard::{GuardDecision, Route};

pub async fn handle(path: &str, ctx: &AppContext) -> anyhow::Result<()> {
    let decision = ctx.shell.navigate(path);

    let (message, status) = match &decision {
        GuardDecision::Render(Route::NotFound(missing)) => (format!("404 - no page at {}", missing), "not_found"),
        GuardDecision::Render(route) => (format!("{} ({})", route.title(), route.path()), "render"),
        GuardDecision::Redirect(target) => (format!("Redirecting to {}", target.path()), "redirect"),
    };

    output_success(
        &ctx.output,
        &message,
        Some(json!({
            "requested": path,
            "decision": status,
            "target": decision.target().path(),
        })),
    )
}
