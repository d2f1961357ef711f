use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated user. Any name the client does not know maps to
/// `Unknown`, which is granted nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Engineer,
    Manager,
    Observer,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    pub const KNOWN: [Role; 3] = [Role::Engineer, Role::Manager, Role::Observer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Engineer => "engineer",
            Role::Manager => "manager",
            Role::Observer => "observer",
            Role::Unknown => "unknown",
        }
    }

    /// Backend role id used by the registration endpoint.
    pub fn id(&self) -> Option<u32> {
        match self {
            Role::Engineer => Some(1),
            Role::Manager => Some(2),
            Role::Observer => Some(3),
            Role::Unknown => None,
        }
    }

    pub fn from_id(id: u32) -> Role {
        match id {
            1 => Role::Engineer,
            2 => Role::Manager,
            3 => Role::Observer,
            _ => Role::Unknown,
        }
    }

    pub fn from_name(name: &str) -> Role {
        match name.trim().to_ascii_lowercase().as_str() {
            "engineer" => Role::Engineer,
            "manager" => Role::Manager,
            "observer" => Role::Observer,
            _ => Role::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Effective role. Falls back to the numeric id only when the name is
    /// missing; an unrecognised name stays `Unknown`.
    pub fn role(&self) -> Role {
        match self.role_name {
            Some(role) => role,
            None => Role::from_id(self.role_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponseData {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
