use std::fmt::Write;

use crate::auth::session::{Session, UserRef};
use crate::bugs::models::Bug;
use crate::bugs::visibility;

pub fn user(user: &UserRef) -> String {
    let mut out = user.label().to_string();
    if let Some(email) = &user.email {
        let _ = write!(out, " <{}>", email);
    }
    if let Some(role) = user.role {
        let _ = write!(out, " ({})", role);
    }
    out
}

pub fn users(users: &[UserRef]) -> String {
    if users.is_empty() {
        return "No developers found".to_string();
    }
    users
        .iter()
        .map(|u| format!("{:<26} {}", u.id, user(u)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn bug_row(bug: &Bug) -> String {
    let assignee = bug
        .assigned_to
        .as_ref()
        .map(|u| u.label())
        .unwrap_or("-");
    format!(
        "{:<26} {:<12} {:<9} {:<16} {}",
        bug.id,
        bug.status.label(),
        bug.priority,
        assignee,
        bug.title
    )
}

pub fn bug_table(bugs: &[&Bug]) -> String {
    if bugs.is_empty() {
        return "No bugs found".to_string();
    }
    let mut out = format!(
        "{:<26} {:<12} {:<9} {:<16} {}",
        "ID", "STATUS", "PRIORITY", "ASSIGNEE", "TITLE"
    );
    for bug in bugs {
        out.push('\n');
        out.push_str(&bug_row(bug));
    }
    out
}

/// Full record plus the actions this session is offered for it.
pub fn bug_detail(bug: &Bug, session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  [{}]", bug.title, bug.id);
    let _ = writeln!(out, "Status:      {}", bug.status.label());
    let _ = writeln!(out, "Priority:    {}", bug.priority);
    let _ = writeln!(
        out,
        "Reported by: {}",
        bug.reported_by.as_ref().map(|u| u.label()).unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "Assigned to: {}",
        bug.assigned_to.as_ref().map(|u| u.label()).unwrap_or("Unassigned")
    );
    if let Some(created) = bug.created_at {
        let _ = writeln!(out, "Created:     {}", created.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(updated) = bug.updated_at {
        let _ = writeln!(out, "Updated:     {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    if !bug.description.is_empty() {
        let _ = write!(out, "\n{}\n", bug.description);
    }

    let actions = actions(bug, session);
    if !actions.is_empty() {
        let _ = write!(out, "\nActions: {}", actions.join(", "));
    }
    out.trim_end().to_string()
}

fn actions(bug: &Bug, session: &Session) -> Vec<&'static str> {
    let mut actions = Vec::new();
    if visibility::can_update_status(session, bug) {
        actions.push("status");
    }
    if visibility::can_assign(session, bug) {
        actions.push("assign");
    }
    if visibility::can_edit(session, bug) {
        actions.push("update");
    }
    if visibility::can_delete(session) {
        actions.push("delete");
    }
    actions
}
