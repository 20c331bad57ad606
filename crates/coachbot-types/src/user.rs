use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A registered chat user.
///
/// The `id` is the chat platform's user id, so no separate identifier is
/// minted on registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Private chat the user registered from.
    pub chat_id: i64,
    pub username: String,
    pub role: Role,
    /// Clients must be approved by an admin before they can log records.
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the user may run admin actions.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin && self.approved
    }
}

/// What a user is allowed to do.
///
/// - Admin: manages programs, exercises and clients
/// - Client: follows programs and logs results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Client => write!(f, "client"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "client" => Ok(Role::Client),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

/// Partial update for a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub role: Option<Role>,
    pub approved: Option<bool>,
}
