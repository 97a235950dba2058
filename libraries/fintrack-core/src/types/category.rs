/// Category domain types
use super::ids::{CategoryId, UserId};
use serde::{Deserialize, Serialize};

/// A user-owned transaction category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category identifier
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Icon name (UI icon set)
    #[serde(default)]
    pub icon: String,

    /// Hex color, e.g. `#10B981`
    #[serde(default)]
    pub color: String,

    /// Owning user
    #[serde(default)]
    pub user_id: UserId,

    /// Creation timestamp (ISO string)
    #[serde(default)]
    pub created_at: String,

    /// Last update timestamp (ISO string)
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForm {
    /// Display name
    pub name: String,
    /// Icon name
    pub icon: String,
    /// Hex color
    pub color: String,
}

/// Partial update of a category; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New icon name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// New hex color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
