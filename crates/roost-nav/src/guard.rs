//! Navigation guard.
//!
//! Runs synchronously before every view transition: an authenticated view
//! must never render, even transiently, for an unauthenticated caller. The
//! check never suspends — the session predicate is a plain local read.

use crate::route::RouteTable;
use roost_core::SessionStore;
use tracing::debug;

/// Outcome of one transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDecision {
    /// The requested transition proceeds unmodified
    Allow,
    /// The transition is replaced with one to the named route
    Redirect {
        /// Replacement destination
        to: String,
    },
}

/// Guard consulted on every view transition.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    table: RouteTable,
    login_route: String,
}

impl NavigationGuard {
    /// Create a guard over a route table, redirecting to the given route
    #[must_use]
    pub fn new(table: RouteTable, login_route: impl Into<String>) -> Self {
        Self {
            table,
            login_route: login_route.into(),
        }
    }

    /// Guard over the chat application's default table
    #[must_use]
    pub fn chat_default() -> Self {
        Self::new(RouteTable::chat_default(), "login")
    }

    /// Decide one transition attempt.
    ///
    /// Unknown targets redirect to login as well: a misspelled name must
    /// not open an authenticated view.
    #[must_use]
    pub fn check(&self, target: &str, session: &SessionStore) -> NavDecision {
        let Some(route) = self.table.get(target) else {
            debug!(target = target, "unknown route, redirecting to login");
            return NavDecision::Redirect {
                to: self.login_route.clone(),
            };
        };

        if route.requires_auth && !session.is_authenticated() {
            debug!(target = target, "unauthenticated, redirecting to login");
            return NavDecision::Redirect {
                to: self.login_route.clone(),
            };
        }

        NavDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticated() -> SessionStore {
        let store = SessionStore::in_memory();
        store.set_token("tok").unwrap();
        store
    }

    #[test]
    fn test_unauthenticated_is_redirected_from_gated_views() {
        let guard = NavigationGuard::chat_default();
        let session = SessionStore::in_memory();

        for target in ["home", "chat", "invitations"] {
            assert_eq!(
                guard.check(target, &session),
                NavDecision::Redirect {
                    to: "login".to_string()
                },
                "{target} must redirect"
            );
        }
    }

    #[test]
    fn test_public_views_always_allowed() {
        let guard = NavigationGuard::chat_default();
        let unauthenticated = SessionStore::in_memory();
        let authenticated = authenticated();

        for target in ["login", "register"] {
            assert_eq!(guard.check(target, &unauthenticated), NavDecision::Allow);
            assert_eq!(guard.check(target, &authenticated), NavDecision::Allow);
        }
    }

    #[test]
    fn test_authenticated_passes_gated_views() {
        let guard = NavigationGuard::chat_default();
        let session = authenticated();

        for target in ["home", "chat", "invitations"] {
            assert_eq!(guard.check(target, &session), NavDecision::Allow);
        }
    }

    #[test]
    fn test_empty_token_does_not_authenticate() {
        let guard = NavigationGuard::chat_default();
        let session = SessionStore::in_memory();
        session.set_token("").unwrap();

        assert_eq!(
            guard.check("home", &session),
            NavDecision::Redirect {
                to: "login".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_target_fails_closed() {
        let guard = NavigationGuard::chat_default();
        let session = authenticated();

        assert_eq!(
            guard.check("no-such-view", &session),
            NavDecision::Redirect {
                to: "login".to_string()
            }
        );
    }

    #[test]
    fn test_logout_revokes_access() {
        let guard = NavigationGuard::chat_default();
        let session = authenticated();
        assert_eq!(guard.check("home", &session), NavDecision::Allow);

        session.clear().unwrap();
        assert_ne!(guard.check("home", &session), NavDecision::Allow);
    }
}
