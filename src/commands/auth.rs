use crate::api::{Credentials, Registration};
use crate::auth::session::Role;
use crate::commands::render;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::validation::{validate_login, validate_registration};

pub async fn login(state: &mut AppState, email: String, password: String) -> AppResult<String> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password,
    };
    validate_login(&credentials)?;

    if !state.session.login(state.api.as_ref(), &credentials).await {
        return Err(AppError::LoginFailed);
    }
    Ok(match state.session.current_user() {
        Some(user) => format!("Logged in as {}", render::user(user)),
        None => "Logged in".to_string(),
    })
}

pub async fn register(
    state: &mut AppState,
    name: String,
    email: String,
    password: String,
    role: Role,
) -> AppResult<String> {
    let registration = Registration {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password,
        role,
    };
    validate_registration(&registration)?;

    let outcome = state
        .session
        .register(state.api.as_ref(), &registration)
        .await;
    if !outcome.success {
        return Err(AppError::Registration(
            outcome
                .error
                .unwrap_or_else(|| "Registration failed".to_string()),
        ));
    }
    let who = outcome
        .data
        .map(|d| render::user(&d.user))
        .unwrap_or(registration.name);
    Ok(format!(
        "Registered {}. Run `bugtrack login` to sign in.",
        who
    ))
}

/// Always wipes storage, so leftover role or user keys without a token go too.
pub fn logout(state: &mut AppState) -> String {
    let was_authenticated = state.session.is_authenticated();
    state.session.logout();
    if was_authenticated {
        "Logged out".to_string()
    } else {
        "Not logged in".to_string()
    }
}

pub fn whoami(state: &AppState) -> String {
    let session = state.session.session();
    match (&session.user, session.is_authenticated()) {
        (Some(user), true) => render::user(user),
        (None, true) => "Logged in (user unknown)".to_string(),
        _ => "Not logged in".to_string(),
    }
}
