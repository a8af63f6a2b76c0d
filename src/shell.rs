use serde::Serialize;

use crate::error::ClientResult;
use crate::guard::{AuthState, GuardDecision, Route, RouteGuard};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: &'static str,
    pub path: String,
}

/// Top-level navigation: links to every protected view plus logout
#[derive(Clone)]
pub struct NavShell {
    session: Session,
    guard: RouteGuard,
}

impl NavShell {
    pub fn new(session: Session) -> Self {
        let guard = RouteGuard::new(session.clone());
        Self { session, guard }
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn auth_state(&self) -> AuthState {
        self.guard.state()
    }

    pub fn links(&self) -> Vec<NavLink> {
        let routes = match self.auth_state() {
            AuthState::Authenticated => vec![Route::Dashboard, Route::Categories, Route::Items, Route::Shared],
            AuthState::Unauthenticated => vec![Route::Login, Route::Register],
        };

        routes
            .iter()
            .map(|route| NavLink {
                title: route.title(),
                path: route.path().to_string(),
            })
            .collect()
    }

    /// One-line navigation bar
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self
            .links()
            .into_iter()
            .map(|link| format!("{} ({})", link.title, link.path))
            .collect();

        if self.auth_state() == AuthState::Authenticated {
            parts.push("Logout".to_string());
        }
        format!("Budget Tracker | {}", parts.join(" | "))
    }

    pub fn navigate(&self, path: &str) -> GuardDecision {
        self.guard.check(Route::parse(path))
    }

    /// Clear the session; the caller lands on the login route
    pub fn logout(&self) -> ClientResult<Route> {
        self.session.clear_token()?;
        Ok(Route::Login)
    }
}
