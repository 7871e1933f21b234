//! Which actions to offer for a bug, given the session.
//!
//! These only decide what the client shows; the server still enforces its
//! own rules.

use crate::auth::session::Session;
use crate::bugs::models::Bug;

/// Managers and admins may assign bugs that nobody owns yet.
pub fn can_assign(session: &Session, bug: &Bug) -> bool {
    session.can_assign_bugs() && bug.assigned_to.is_none()
}

/// Managers and admins may move any bug; developers only the ones
/// assigned to them.
pub fn can_update_status(session: &Session, bug: &Bug) -> bool {
    if !session.can_edit_bug_status() {
        return false;
    }
    if session.can_view_all_bugs() {
        return true;
    }
    session.user_id().is_some_and(|id| bug.is_assigned_to(id))
}

/// Title, description and priority: managers and admins, or the reporter
/// or assignee of the bug.
pub fn can_edit(session: &Session, bug: &Bug) -> bool {
    if session.can_view_all_bugs() {
        return true;
    }
    let Some(id) = session.user_id() else {
        return false;
    };
    bug.is_assigned_to(id) || bug.reported_by.as_ref().is_some_and(|u| u.id == id)
}

pub fn can_delete(session: &Session) -> bool {
    session.can_delete_bugs()
}
