use chrono::Utc;
use shared::{Budget, CreateBudgetRequest};
use tracing::info;
use uuid::Uuid;

use crate::db::DbConnection;
use crate::domain::DomainError;

#[derive(Clone)]
pub struct BudgetService {
    db: DbConnection,
}

impl BudgetService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_budget(
        &self,
        owner_id: Uuid,
        request: CreateBudgetRequest,
    ) -> Result<Budget, DomainError> {
        if request.category.is_empty() {
            return Err(DomainError::Validation(
                "Category must not be empty".to_string(),
            ));
        }
        if !request.amount.is_finite() || request.amount < 0.0 {
            return Err(DomainError::Validation(
                "Budget amount must be a non-negative number".to_string(),
            ));
        }

        let budget = Budget {
            id: Uuid::new_v4(),
            owner_id,
            amount: request.amount,
            category: request.category,
            created_at: Utc::now(),
        };

        self.db.insert_budget(&budget).await?;
        info!(
            "Created budget {} for owner {}: {} on {}",
            budget.id, owner_id, budget.amount, budget.category
        );

        Ok(budget)
    }

    /// All of the owner's budgets, newest first.
    pub async fn list_budgets(&self, owner_id: Uuid) -> Result<Vec<Budget>, DomainError> {
        Ok(self.db.list_budgets(owner_id).await?)
    }
}
