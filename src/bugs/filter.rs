use crate::bugs::models::{Bug, BugStatus};

/// List filter. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFilter {
    pub status: Option<BugStatus>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub assignee: Option<String>,
}

impl BugFilter {
    pub fn status(mut self, status: BugStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn assignee(mut self, user_id: impl Into<String>) -> Self {
        self.assignee = Some(user_id.into());
        self
    }

    pub fn matches(&self, bug: &Bug) -> bool {
        if self.status.is_some_and(|s| s != bug.status) {
            return false;
        }
        if let Some(user_id) = &self.assignee {
            if !bug.is_assigned_to(user_id) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                bug.title.to_lowercase().contains(&query)
                    || bug.description.to_lowercase().contains(&query)
            }
        }
    }
}
