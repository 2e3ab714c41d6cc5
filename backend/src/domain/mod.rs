//! Business logic for the finance tracker, kept independent of the HTTP layer.

pub mod budget_service;
pub mod error;
pub mod period;
pub mod report_service;
pub mod transaction_service;
pub mod user_service;

pub use budget_service::BudgetService;
pub use error::DomainError;
pub use period::ReportingPeriod;
pub use report_service::ReportService;
pub use transaction_service::TransactionService;
pub use user_service::UserService;
