use crate::bugs::filter::BugFilter;
use crate::bugs::models::{BugChanges, BugStatus, NewBug, Priority};
use crate::bugs::visibility;
use crate::commands::render;
use crate::config::BugsCommand;
use crate::error::{AppError, AppResult};
use crate::routes::LOGIN_PATH;
use crate::state::AppState;
use crate::validation::{validate_changes, validate_new_bug, validate_status_change};

pub async fn run(state: &mut AppState, command: BugsCommand) -> AppResult<String> {
    match command {
        BugsCommand::List {
            status,
            search,
            mine,
        } => list(state, status, search, mine).await,
        BugsCommand::Show { id } => show(state, &id).await,
        BugsCommand::Report {
            title,
            description,
            priority,
        } => report(state, title, description, priority).await,
        BugsCommand::Status { id, status } => update_status(state, &id, status).await,
        BugsCommand::Assign { id, developer_id } => assign(state, &id, &developer_id).await,
        BugsCommand::Update {
            id,
            title,
            description,
            priority,
        } => {
            let changes = BugChanges {
                title: title.map(|t| t.trim().to_string()),
                description,
                priority,
            };
            update(state, &id, changes).await
        }
        BugsCommand::Delete { id } => delete(state, &id).await,
    }
}

async fn list(
    state: &mut AppState,
    status: Option<BugStatus>,
    search: Option<String>,
    mine: bool,
) -> AppResult<String> {
    let mut filter = BugFilter::default();
    if let Some(status) = status {
        filter = filter.status(status);
    }
    if let Some(search) = search {
        filter = filter.search(search);
    }
    if mine {
        let Some(id) = state.session.session().user_id() else {
            return Err(AppError::Redirect(LOGIN_PATH));
        };
        filter = filter.assignee(id.to_string());
    }

    state
        .bugs
        .fetch_all(state.api.as_ref(), &mut state.session)
        .await?;
    Ok(render::bug_table(&state.bugs.filter(&filter)))
}

async fn show(state: &mut AppState, id: &str) -> AppResult<String> {
    let bug = state
        .bugs
        .fetch_by_id(state.api.as_ref(), &mut state.session, id)
        .await?;
    Ok(render::bug_detail(&bug, state.session.session()))
}

async fn report(
    state: &mut AppState,
    title: String,
    description: String,
    priority: Priority,
) -> AppResult<String> {
    let data = NewBug {
        title: title.trim().to_string(),
        description,
        priority,
    };
    validate_new_bug(&data)?;

    let bug = state
        .bugs
        .create(state.api.as_ref(), &mut state.session, &data)
        .await?;
    Ok(format!("Reported bug {}: {}", bug.id, bug.title))
}

/// Loads the bug first so a developer is stopped before touching a bug
/// that is not theirs.
async fn update_status(state: &mut AppState, id: &str, status: BugStatus) -> AppResult<String> {
    validate_status_change(status)?;
    let bug = state
        .bugs
        .fetch_by_id(state.api.as_ref(), &mut state.session, id)
        .await?;
    if !visibility::can_update_status(state.session.session(), &bug) {
        return Err(AppError::Forbidden(
            "You can only update the status of bugs assigned to you".into(),
        ));
    }
    if bug.status == status {
        return Ok(format!("Bug {} is already {}", id, status.label()));
    }

    state
        .bugs
        .update_status(state.api.as_ref(), &mut state.session, id, status)
        .await?;
    Ok(format!("Bug {} is now {}", id, status.label()))
}

async fn assign(state: &mut AppState, id: &str, developer_id: &str) -> AppResult<String> {
    if !state.session.session().can_assign_bugs() {
        return Err(AppError::Forbidden(
            "You do not have permission to assign bugs".into(),
        ));
    }

    let bug = state
        .bugs
        .assign(state.api.as_ref(), &mut state.session, id, developer_id)
        .await?;
    let assignee = bug
        .assigned_to
        .as_ref()
        .map(|u| u.label().to_string())
        .unwrap_or_else(|| developer_id.to_string());
    Ok(format!("Assigned bug {} to {}", bug.id, assignee))
}

async fn update(state: &mut AppState, id: &str, changes: BugChanges) -> AppResult<String> {
    validate_changes(&changes)?;

    let current = state
        .bugs
        .fetch_by_id(state.api.as_ref(), &mut state.session, id)
        .await?;
    if !visibility::can_edit(state.session.session(), &current) {
        return Err(AppError::Forbidden(
            "You do not have permission to edit this bug".into(),
        ));
    }

    let bug = state
        .bugs
        .update(state.api.as_ref(), &mut state.session, id, &changes)
        .await?;
    Ok(format!("Updated bug {}\n{}", bug.id, render::bug_row(&bug)))
}

async fn delete(state: &mut AppState, id: &str) -> AppResult<String> {
    if !visibility::can_delete(state.session.session()) {
        return Err(AppError::Forbidden(
            "You do not have permission to delete bugs".into(),
        ));
    }

    state
        .bugs
        .delete(state.api.as_ref(), &mut state.session, id)
        .await?;
    Ok(format!("Deleted bug {}", id))
}

pub async fn developers(state: &mut AppState) -> AppResult<String> {
    let developers = state
        .bugs
        .fetch_developers(state.api.as_ref(), &mut state.session)
        .await?;
    Ok(render::users(developers))
}
