//! Client-side routes and the guard that keeps protected views behind a session.
//!
//! The guard is pure and synchronous: it only asks the session store whether a
//! token is present. Token validity is settled by the API, which answers 401
//! and triggers a forced logout in the views.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Categories,
    Items,
    Shared,
    NotFound(String),
}

impl Route {
    /// Every route reachable through the navigation surface
    pub const NAVIGABLE: [Route; 6] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Categories,
        Route::Items,
        Route::Shared,
    ];

    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = trimmed.trim_end_matches('/');

        match normalized {
            "" => Route::Root,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/categories" => Route::Categories,
            "/items" => Route::Items,
            "/shared" => Route::Shared,
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Categories => "/categories",
            Route::Items => "/items",
            Route::Shared => "/shared",
            Route::NotFound(path) => path,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Root => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Dashboard => "Dashboard",
            Route::Categories => "Categories",
            Route::Items => "Items",
            Route::Shared => "Shared Budgets",
            Route::NotFound(_) => "Not Found",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Categories | Route::Items | Route::Shared
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    Redirect(Route),
}

impl GuardDecision {
    /// The route that ends up on screen
    pub fn target(&self) -> &Route {
        match self {
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardDecision::Redirect(_))
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    session: Session,
}

impl RouteGuard {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn state(&self) -> AuthState {
        if self.session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn check(&self, route: Route) -> GuardDecision {
        let state = self.state();

        let decision = match (&route, state) {
            (Route::Root, AuthState::Authenticated) => GuardDecision::Redirect(Route::Dashboard),
            (Route::Root, AuthState::Unauthenticated) => GuardDecision::Redirect(Route::Login),
            (r, AuthState::Unauthenticated) if r.is_protected() => {
                GuardDecision::Redirect(Route::Login)
            }
            _ => GuardDecision::Render(route),
        };

        tracing::debug!(?state, ?decision, "route guard");
        decision
    }

    /// Fail with the login redirect unless `route` may render
    pub fn require(&self, route: Route) -> Result<Route, crate::error::ClientError> {
        match self.check(route) {
            GuardDecision::Render(route) => Ok(route),
            GuardDecision::Redirect(Route::Login) => Err(crate::error::ClientError::not_authenticated()),
            GuardDecision::Redirect(route) => Ok(route),
        }
    }

    /// Render the protected content only when the guard lets the route through
    pub fn protect<R>(&self, route: Route, render: impl FnOnce(&Route) -> R) -> Result<R, Route> {
        match self.check(route) {
            GuardDecision::Render(route) => Ok(render(&route)),
            GuardDecision::Redirect(target) => Err(target),
        }
    }
}
