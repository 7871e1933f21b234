use crate::auth::session::{Role, Session};
use crate::routes::guard::{guard, Navigation, RouteMeta};

const REPORTERS: &[Role] = &[Role::Developer, Role::Manager, Role::Admin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    /// `/`-separated pattern; `:name` segments capture, `*` matches anything.
    pub pattern: &'static str,
    pub meta: RouteMeta,
}

/// Routes in match order. `/bugs/new` must come before `/bugs/:id`.
pub const ROUTES: &[Route] = &[
    Route {
        name: "Home",
        pattern: "/",
        meta: RouteMeta::AUTH,
    },
    Route {
        name: "Login",
        pattern: "/login",
        meta: RouteMeta::GUEST,
    },
    Route {
        name: "Register",
        pattern: "/register",
        meta: RouteMeta::GUEST,
    },
    Route {
        name: "BugList",
        pattern: "/bugs",
        meta: RouteMeta::AUTH,
    },
    Route {
        name: "ReportBug",
        pattern: "/bugs/new",
        meta: RouteMeta::with_roles(REPORTERS),
    },
    Route {
        name: "BugDetails",
        pattern: "/bugs/:id",
        meta: RouteMeta::AUTH,
    },
    Route {
        name: "NotFound",
        pattern: "*",
        meta: RouteMeta::PUBLIC,
    },
];

/// A route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub route: &'static Route,
    pub params: Vec<(&'static str, String)>,
}

impl Matched {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['?', '#'])
        .next()
        .unwrap_or("")
        .split('/')
        .filter(|s| !s.is_empty())
}

fn match_route(route: &'static Route, path: &str) -> Option<Matched> {
    if route.pattern == "*" {
        return Some(Matched {
            route,
            params: Vec::new(),
        });
    }

    let pattern: Vec<&'static str> = segments(route.pattern).collect();
    let actual: Vec<&str> = segments(path).collect();
    if pattern.len() != actual.len() {
        return None;
    }

    let mut params = Vec::new();
    for (&p, &a) in pattern.iter().zip(actual.iter()) {
        match p.strip_prefix(':') {
            Some(name) => params.push((name, a.to_string())),
            None if p == a => {}
            None => return None,
        }
    }
    Some(Matched { route, params })
}

/// First route in [`ROUTES`] matching `path`. Always succeeds thanks to the
/// catch-all.
pub fn resolve(path: &str) -> Matched {
    ROUTES
        .iter()
        .find_map(|r| match_route(r, path))
        .unwrap_or(Matched {
            route: &ROUTES[ROUTES.len() - 1],
            params: Vec::new(),
        })
}

/// Resolve `path` and run the guard for it.
pub fn navigate(path: &str, session: &Session) -> (Matched, Navigation) {
    let matched = resolve(path);
    let decision = guard(&matched.route.meta, session);
    tracing::debug!(path, route = matched.route.name, %decision, "Navigation");
    (matched, decision)
}
