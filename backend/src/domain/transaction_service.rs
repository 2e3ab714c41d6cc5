use chrono::{SubsecRound, Utc};
use shared::{CreateTransactionRequest, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::db::DbConnection;
use crate::domain::DomainError;

const MAX_DESCRIPTION_LEN: usize = 256;

#[derive(Clone)]
pub struct TransactionService {
    db: DbConnection,
}

impl TransactionService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Record a transaction for `owner_id`. The category is stored exactly
    /// as supplied (no trimming or case folding); the date defaults to now.
    pub async fn create_transaction(
        &self,
        owner_id: Uuid,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, DomainError> {
        if request.category.is_empty() {
            return Err(DomainError::Validation(
                "Category must not be empty".to_string(),
            ));
        }
        if let Some(description) = &request.description {
            if description.len() > MAX_DESCRIPTION_LEN {
                return Err(DomainError::Validation(format!(
                    "Description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        if !request.amount.is_finite() {
            return Err(DomainError::Validation(
                "Amount must be a finite number".to_string(),
            ));
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            owner_id,
            amount: request.amount,
            category: request.category,
            description: request.description,
            // Dates persist at whole-second precision, so truncate up front
            // to keep the create response identical to later reads.
            date: request.date.unwrap_or_else(Utc::now).trunc_subsecs(0),
        };

        self.db.insert_transaction(&transaction).await?;
        info!(
            "Recorded transaction {} for owner {}: {} in {}",
            transaction.id, owner_id, transaction.amount, transaction.category
        );

        Ok(transaction)
    }

    /// All of the owner's transactions, newest first.
    pub async fn list_transactions(&self, owner_id: Uuid) -> Result<Vec<Transaction>, DomainError> {
        Ok(self.db.list_transactions(owner_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserRecord;
    use chrono::TimeZone;

    async fn setup() -> (TransactionService, Uuid) {
        let db = DbConnection::init_test().await.unwrap();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            created_at: Utc::now(),
        };
        db.insert_user(&user).await.unwrap();
        (TransactionService::new(db), user.id)
    }

    #[tokio::test]
    async fn create_defaults_date_to_now() {
        let (service, owner) = setup().await;

        let before = Utc::now();
        let created = service
            .create_transaction(
                owner,
                CreateTransactionRequest {
                    amount: 25.0,
                    category: "Gifts".to_string(),
                    description: None,
                    date: None,
                },
            )
            .await
            .unwrap();

        assert!(created.date >= before - chrono::Duration::seconds(1));
        assert_eq!(created.owner_id, owner);
        assert_eq!(created.amount, 25.0);
    }

    #[tokio::test]
    async fn create_preserves_category_verbatim() {
        let (service, owner) = setup().await;

        let created = service
            .create_transaction(
                owner,
                CreateTransactionRequest {
                    amount: -9.99,
                    category: " groceries ".to_string(),
                    description: Some("corner shop".to_string()),
                    date: Some(Utc.with_ymd_and_hms(2025, 5, 2, 18, 0, 0).unwrap()),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.category, " groceries ");

        let listed = service.list_transactions(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, " groceries ");
    }

    #[tokio::test]
    async fn create_response_date_matches_stored_date() {
        let (service, owner) = setup().await;

        let subsecond = Utc.with_ymd_and_hms(2025, 5, 2, 18, 0, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        let created = service
            .create_transaction(
                owner,
                CreateTransactionRequest {
                    amount: 12.5,
                    category: "Misc".to_string(),
                    description: None,
                    date: Some(subsecond),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.date.timestamp_subsec_nanos(), 0);

        let listed = service.list_transactions(owner).await.unwrap();
        assert_eq!(listed[0].date, created.date);
    }

    #[tokio::test]
    async fn empty_category_is_rejected() {
        let (service, owner) = setup().await;

        let result = service
            .create_transaction(
                owner,
                CreateTransactionRequest {
                    amount: 1.0,
                    category: String::new(),
                    description: None,
                    date: None,
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn non_finite_amount_is_rejected() {
        let (service, owner) = setup().await;

        let result = service
            .create_transaction(
                owner,
                CreateTransactionRequest {
                    amount: f64::NAN,
                    category: "Misc".to_string(),
                    description: None,
                    date: None,
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let (service, owner) = setup().await;

        for (amount, day) in [(10.0, 1), (20.0, 20), (30.0, 10)] {
            service
                .create_transaction(
                    owner,
                    CreateTransactionRequest {
                        amount,
                        category: "Misc".to_string(),
                        description: None,
                        date: Some(Utc.with_ymd_and_hms(2025, 5, day, 12, 0, 0).unwrap()),
                    },
                )
                .await
                .unwrap();
        }

        let listed = service.list_transactions(owner).await.unwrap();
        let amounts: Vec<f64> = listed.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![20.0, 30.0, 10.0]);
    }
}
