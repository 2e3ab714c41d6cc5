//! The monthly dashboard aggregator.
//!
//! Turns the owner's transactions for one calendar month into per-category
//! income/expense/net summaries plus grand totals. This is a pure
//! read/aggregate/respond cycle: nothing is cached, nothing is written.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::{CategorySummary, MonthlyReport, MonthlySummary, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::db::DbConnection;
use crate::domain::{DomainError, ReportingPeriod};

#[derive(Clone)]
pub struct ReportService {
    db: DbConnection,
}

impl ReportService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Build the monthly report for the calendar month containing
    /// `reference`. The owner id is trusted; it has already been resolved by
    /// the auth layer. A failed fetch propagates as [`DomainError::Store`],
    /// never as a fabricated empty report.
    pub async fn monthly_report(
        &self,
        owner_id: Uuid,
        reference: DateTime<Utc>,
    ) -> Result<MonthlyReport, DomainError> {
        let period = ReportingPeriod::month_containing(reference);
        info!(
            "Building monthly report for owner {} over {} .. {}",
            owner_id, period.start, period.end
        );

        let transactions = self
            .db
            .transactions_in_range(owner_id, period.start, period.end)
            .await?;

        info!(
            "Aggregating {} transactions for owner {}",
            transactions.len(),
            owner_id
        );
        Ok(aggregate(&transactions))
    }
}

/// Aggregate an already-fetched transaction set into a monthly report.
///
/// Grouping is by exact category string: case-sensitive, untrimmed. That is
/// deliberate and load-bearing for compatibility; "Groceries" and
/// "groceries" are distinct categories.
///
/// Amounts fold per category in first-encounter order. Each category's
/// `total` is computed as `income - expenses` (not a separate fold), and the
/// monthly totals are the sums of the per-category fields, so the reported
/// identities hold exactly even for f64 arithmetic.
pub fn aggregate(transactions: &[Transaction]) -> MonthlyReport {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CategorySummary> = Vec::new();

    for tx in transactions {
        let i = *index.entry(tx.category.as_str()).or_insert_with(|| {
            groups.push(CategorySummary {
                category: tx.category.clone(),
                income: 0.0,
                expenses: 0.0,
                total: 0.0,
                count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[i];
        if tx.amount > 0.0 {
            group.income += tx.amount;
        } else if tx.amount < 0.0 {
            group.expenses += -tx.amount;
        }
        // Zero amounts reach neither bucket but still count.
        group.count += 1;
    }

    for group in &mut groups {
        group.total = group.income - group.expenses;
    }

    // Highest net contributor first; the sort is stable, so ties keep their
    // first-encounter order.
    groups.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));

    let income: f64 = groups.iter().map(|g| g.income).sum();
    let expenses: f64 = groups.iter().map(|g| g.expenses).sum();

    MonthlyReport {
        monthly: MonthlySummary { income, expenses },
        balance: income - expenses,
        category_breakdown: groups,
    }
}
