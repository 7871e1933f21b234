use std::fmt;

use crate::auth::session::{Role, Session};

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_PATH: &str = "/bugs";

/// Access requirements attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Only reachable while logged out (login, register).
    pub requires_guest: bool,
    /// Role allow-list. `None` means any role.
    pub roles: Option<&'static [Role]>,
}

impl RouteMeta {
    pub const PUBLIC: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_guest: false,
        roles: None,
    };

    pub const AUTH: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_guest: false,
        roles: None,
    };

    pub const GUEST: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_guest: true,
        roles: None,
    };

    pub const fn with_roles(roles: &'static [Role]) -> RouteMeta {
        RouteMeta {
            requires_auth: true,
            requires_guest: false,
            roles: Some(roles),
        }
    }
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

impl Navigation {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Navigation::Proceed)
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Proceed => f.write_str("proceed"),
            Navigation::Redirect(to) => write!(f, "redirect to {}", to),
        }
    }
}

/// Decide whether `session` may enter a route with `meta`. Checks run in
/// order: authentication, role allow-list, guest-only.
pub fn guard(meta: &RouteMeta, session: &Session) -> Navigation {
    if meta.requires_auth && !session.is_authenticated() {
        return Navigation::Redirect(LOGIN_PATH);
    }

    if let Some(roles) = meta.roles {
        if !session.has_any_role(roles) {
            return Navigation::Redirect(DEFAULT_PATH);
        }
    }

    if meta.requires_guest && session.is_authenticated() {
        return Navigation::Redirect(DEFAULT_PATH);
    }

    Navigation::Proceed
}
