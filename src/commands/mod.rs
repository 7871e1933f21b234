//! CLI command handlers. Each command stands in for a page: it is bound to a
//! route, passes the navigation guard, then drives the stores and returns
//! the text to print.

pub mod auth;
pub mod bugs;
mod render;

use crate::config::Command;
use crate::error::{AppError, AppResult};
use crate::routes::{self, Navigation};
use crate::state::AppState;

pub async fn run(state: &mut AppState, command: Command) -> AppResult<String> {
    if let Some(path) = command.route_path() {
        let (matched, decision) = routes::navigate(&path, state.session.session());
        if let Navigation::Redirect(to) = decision {
            tracing::info!(route = matched.route.name, to, "Navigation redirected");
            return Err(AppError::Redirect(to));
        }
    }

    match command {
        Command::Login { email, password } => auth::login(state, email, password).await,
        Command::Register {
            name,
            email,
            password,
            role,
        } => auth::register(state, name, email, password, role).await,
        Command::Logout => Ok(auth::logout(state)),
        Command::Whoami => Ok(auth::whoami(state)),
        Command::Developers => bugs::developers(state).await,
        Command::Route { path } => Ok(describe_route(state, &path)),
        Command::Bugs(command) => bugs::run(state, command).await,
    }
}

fn describe_route(state: &AppState, path: &str) -> String {
    let (matched, decision) = routes::navigate(path, state.session.session());
    let mut out = format!("{} -> {}", path, matched.route.name);
    for (name, value) in &matched.params {
        out.push_str(&format!(" {}={}", name, value));
    }
    out.push_str(&format!(": {}", decision));
    out
}
