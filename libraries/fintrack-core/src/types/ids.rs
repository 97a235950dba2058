/// ID types for FinTrack entities
///
/// The backend issues opaque string identifiers (UUIDs in practice, but
/// mock and seed data use readable slugs such as `"food"`), so every ID is a
/// transparent string newtype.
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the backend sent an empty identifier
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// User identifier
    UserId
);

string_id!(
    /// Category identifier
    CategoryId
);

string_id!(
    /// Transaction identifier
    TransactionId
);

string_id!(
    /// Budget identifier
    BudgetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = CategoryId::new("food");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"food\"");

        let back: CategoryId = serde_json::from_str("\"food\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "food");
    }
}
