/// User domain type
use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Authenticated user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Identifier in the external auth provider
    #[serde(default)]
    pub auth_id: String,

    /// Login email
    pub email: String,

    /// Handle chosen at registration
    #[serde(default)]
    pub username: String,

    /// Display name
    #[serde(default)]
    pub display_name: String,

    /// Account creation timestamp (ISO string)
    #[serde(default)]
    pub created_at: String,

    /// Last update timestamp (ISO string)
    #[serde(default)]
    pub updated_at: String,
}

impl User {
    /// Name to show in headers: display name, then username, then email.
    pub fn label(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if !self.username.is_empty() {
            &self.username
        } else {
            &self.email
        }
    }
}
