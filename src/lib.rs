pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod session;
pub mod shell;
pub mod view;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
