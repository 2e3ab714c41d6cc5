//! Shared data types for the finance tracker.
//!
//! These are the serde structs exchanged over the HTTP boundary between the
//! backend and its clients. Field names on the wire are camelCase to stay
//! compatible with the existing API consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single income or expense record.
///
/// A positive `amount` is income, a negative amount is an expense. Zero is
/// allowed and counts toward totals without landing in either bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    /// ID of the user this transaction belongs to.
    pub owner_id: Uuid,
    /// Signed amount: positive = income, negative = expense.
    pub amount: f64,
    /// Free-form category label. Matching is exact and case-sensitive.
    pub category: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

/// A per-category spending budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub amount: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    /// Optional date override; defaults to the server clock's now.
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub amount: f64,
    pub category: String,
}

/// Income and expense totals across all categories in the reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub income: f64,
    pub expenses: f64,
}

/// Aggregates for one category within the reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    /// Sum of positive amounts.
    pub income: f64,
    /// Sum of the absolute values of negative amounts.
    pub expenses: f64,
    /// Sum of raw amounts, i.e. income - expenses.
    pub total: f64,
    pub count: u32,
}

/// The monthly dashboard payload.
///
/// `category_breakdown` is ordered by descending `total` (highest net
/// contributor first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub monthly: MonthlySummary,
    pub category_breakdown: Vec<CategorySummary>,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    /// Minimum 6 characters.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

/// The authenticated user's profile, without credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Generic error body returned with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
