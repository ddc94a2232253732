//! Route metadata.
//!
//! The guard needs exactly one fact per routable view: whether it requires
//! an authenticated session. Everything else (paths, rendering) belongs to
//! the embedding front-end.

use std::collections::HashMap;

/// A routable view and its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Route name, the key transitions are requested by
    pub name: String,
    /// View path, informational only
    pub path: String,
    /// Whether the view requires an authenticated session
    pub requires_auth: bool,
}

impl Route {
    /// Create a public route
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            requires_auth: false,
        }
    }

    /// Mark the route as requiring authentication
    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// Name-keyed route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route, replacing any previous one with the same name
    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.insert(route.name.clone(), route);
        self
    }

    /// Look up a route by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// The chat application's default table.
    #[must_use]
    pub fn chat_default() -> Self {
        Self::new()
            .with_route(Route::new("home", "/").requires_auth())
            .with_route(Route::new("chat", "/chats/:id").requires_auth())
            .with_route(Route::new("invitations", "/invitations").requires_auth())
            .with_route(Route::new("login", "/login"))
            .with_route(Route::new("register", "/register"))
    }
}
