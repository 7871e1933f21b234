pub mod guard;
pub mod table;

pub use guard::{guard, Navigation, RouteMeta, DEFAULT_PATH, LOGIN_PATH};
pub use table::{navigate, resolve, Matched, Route, ROUTES};
