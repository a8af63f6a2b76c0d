pub mod auth;
pub mod categories;
pub mod config;
pub mod dashboard;
pub mod items;
pub mod open;
pub mod shared;

use crate::error::ClientError;

/// Lead with the view's inline message while keeping the typed error
/// reachable for `--json` output
pub(crate) fn inline_error(message: Option<String>, err: ClientError) -> anyhow::Error {
    match message {
        Some(message) => anyhow::Error::new(err).context(message),
        None => err.into(),
    }
}
