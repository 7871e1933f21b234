use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission level of a user. Every derived permission flag is a pure
/// function of the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Developer, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "developer" => Ok(Role::Developer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Deserialize an optional role, mapping strings the client does not know
/// to `None` instead of failing the whole payload.
fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()))
}

/// A user as the API reports it. Bug payloads sometimes carry only the id,
/// so a bare string deserializes into a reference with an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Name when known, id otherwise.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Deserialize)]
struct UserObject {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient_role")]
    role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserWire {
    Id(String),
    Object(UserObject),
}

impl<'de> Deserialize<'de> for UserRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match UserWire::deserialize(deserializer)? {
            UserWire::Id(id) => UserRef::new(id, ""),
            UserWire::Object(u) => UserRef {
                id: u.id,
                name: u.name,
                email: u.email,
                role: u.role,
            },
        })
    }
}

/// Client-side authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserRef>,
    pub role: Option<Role>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserRef) -> Self {
        let role = user.role;
        Self {
            token: Some(token.into()),
            user: Some(user),
            role,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_developer(&self) -> bool {
        self.role == Some(Role::Developer)
    }

    pub fn is_manager(&self) -> bool {
        self.role == Some(Role::Manager)
    }

    pub fn can_report_bugs(&self) -> bool {
        self.has_any_role(&[Role::Developer, Role::Manager, Role::Admin])
    }

    pub fn can_assign_bugs(&self) -> bool {
        self.has_any_role(&[Role::Manager, Role::Admin])
    }

    pub fn can_edit_bug_status(&self) -> bool {
        self.has_any_role(&[Role::Developer, Role::Manager, Role::Admin])
    }

    pub fn can_view_all_bugs(&self) -> bool {
        self.has_any_role(&[Role::Manager, Role::Admin])
    }

    pub fn can_delete_bugs(&self) -> bool {
        self.has_any_role(&[Role::Manager, Role::Admin])
    }

    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        self.role.is_some_and(|r| allowed.contains(&r))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn clear(&mut self) {
        *self = Session::default();
    }
}
