//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

/// Role attached to a [`Principal`].
///
/// On the wire roles are integers: `0` is admin, `1` is annotator. Any other
/// value decodes as [`Role::Other`] so that a newer authentication service
/// cannot accidentally grant admin rights through an unknown code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Role {
    Admin,
    Annotator,
    Other(i64),
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Annotator => "annotator",
            Role::Other(_) => "other",
        }
    }
}

impl From<i64> for Role {
    fn from(code: i64) -> Self {
        match code {
            0 => Role::Admin,
            1 => Role::Annotator,
            other => Role::Other(other),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => 0,
            Role::Annotator => 1,
            Role::Other(code) => code,
        }
    }
}

/// Identity returned by the authentication service.
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    #[serde(default)]
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
