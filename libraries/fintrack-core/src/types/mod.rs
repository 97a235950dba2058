mod auth;
mod budget;
mod category;
mod dates;
mod envelope;
mod ids;
mod stats;
mod transaction;
mod user;

pub use auth::{AuthResponse, LoginForm, ProfileUpdate, RegisterForm};
pub use budget::{Budget, BudgetForm, BudgetPeriod, BudgetUpdate};
pub use category::{Category, CategoryForm, CategoryUpdate};
pub use dates::parse_api_date;
pub use envelope::ApiEnvelope;
pub use ids::{BudgetId, CategoryId, TransactionId, UserId};
pub use stats::{BudgetAnalysis, BudgetsSummary, CategoryStats, MonthlyTrend, TransactionStats};
pub use transaction::{
    Transaction, TransactionFilters, TransactionForm, TransactionType, TransactionUpdate,
};
pub use user::User;
