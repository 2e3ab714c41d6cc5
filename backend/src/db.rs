use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use shared::{Budget, Transaction};
use sqlx::{migrate::MigrateDatabase, sqlite::SqliteRow, Row, Sqlite, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// DbConnection manages all database access for the service.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

/// A stored user, including credential material. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl DbConnection {
    /// Connect to the database at `url`, creating it and its schema if needed.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL REFERENCES users(id),
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_owner_date \
             ON transactions(owner_id, date)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL REFERENCES users(id),
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool.
    pub fn pool(&self) -> &SqlitePool {
        &*self.pool
    }

    pub async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(encode_date(&user.created_at))
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, first_name, last_name, created_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, first_name, last_name, created_at \
             FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&*self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    pub async fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            "INSERT INTO transactions (id, owner_id, amount, category, description, date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(tx.id.to_string())
        .bind(tx.owner_id.to_string())
        .bind(tx.amount)
        .bind(&tx.category)
        .bind(&tx.description)
        .bind(encode_date(&tx.date))
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// All of one owner's transactions, newest first.
    pub async fn list_transactions(&self, owner_id: Uuid) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, amount, category, description, date \
             FROM transactions WHERE owner_id = ? ORDER BY date DESC",
        )
        .bind(owner_id.to_string())
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    /// One owner's transactions with `start <= date <= end`, both ends
    /// inclusive. RFC 3339 timestamps in UTC compare lexicographically, so
    /// the range filter runs as a plain string comparison in SQLite.
    pub async fn transactions_in_range(
        &self,
        owner_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, amount, category, description, date \
             FROM transactions WHERE owner_id = ? AND date >= ? AND date <= ?",
        )
        .bind(owner_id.to_string())
        .bind(encode_date(&start))
        .bind(encode_date(&end))
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    pub async fn insert_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            "INSERT INTO budgets (id, owner_id, amount, category, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(budget.id.to_string())
        .bind(budget.owner_id.to_string())
        .bind(budget.amount)
        .bind(&budget.category)
        .bind(encode_date(&budget.created_at))
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    /// All of one owner's budgets, newest first.
    pub async fn list_budgets(&self, owner_id: Uuid) -> Result<Vec<Budget>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, amount, category, created_at \
             FROM budgets WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id.to_string())
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(budget_from_row).collect()
    }
}

/// Timestamps are stored as whole-second RFC 3339 strings in UTC so that
/// string ordering matches chronological ordering.
fn encode_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| anyhow!("invalid stored timestamp {raw}: {e}"))?
        .with_timezone(&Utc))
}

fn decode_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| anyhow!("invalid stored uuid {raw}: {e}"))
}

fn user_from_row(row: &SqliteRow) -> Result<UserRecord> {
    Ok(UserRecord {
        id: decode_uuid(row.get("id"))?,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: decode_date(row.get("created_at"))?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    Ok(Transaction {
        id: decode_uuid(row.get("id"))?,
        owner_id: decode_uuid(row.get("owner_id"))?,
        amount: row.get("amount"),
        category: row.get("category"),
        description: row.get("description"),
        date: decode_date(row.get("date"))?,
    })
}

fn budget_from_row(row: &SqliteRow) -> Result<Budget> {
    Ok(Budget {
        id: decode_uuid(row.get("id"))?,
        owner_id: decode_uuid(row.get("owner_id"))?,
        amount: row.get("amount"),
        category: row.get("category"),
        created_at: decode_date(row.get("created_at"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn setup_test() -> DbConnection {
        DbConnection::init_test()
            .await
            .expect("Failed to create test database")
    }

    async fn insert_test_user(db: &DbConnection, email: &str) -> UserRecord {
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        };
        db.insert_user(&user).await.expect("Failed to insert user");
        user
    }

    fn test_transaction(owner_id: Uuid, amount: f64, date: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            owner_id,
            amount,
            category: "Misc".to_string(),
            description: None,
            date,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let db = setup_test().await;
        let user = insert_test_user(&db, "ada@example.com").await;

        let by_email = db
            .find_user_by_email("ada@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.first_name, "Ada");

        let by_id = db.find_user_by_id(user.id).await.unwrap();
        assert!(by_id.is_some());

        let missing = db.find_user_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = setup_test().await;
        insert_test_user(&db, "ada@example.com").await;

        let duplicate = UserRecord {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$other".to_string(),
            first_name: "Another".to_string(),
            last_name: "Ada".to_string(),
            created_at: Utc::now(),
        };
        assert!(db.insert_user(&duplicate).await.is_err());
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first() {
        let db = setup_test().await;
        let user = insert_test_user(&db, "ada@example.com").await;

        let older = test_transaction(
            user.id,
            10.0,
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        );
        let newer = test_transaction(
            user.id,
            -5.0,
            Utc.with_ymd_and_hms(2025, 3, 20, 8, 0, 0).unwrap(),
        );
        db.insert_transaction(&older).await.unwrap();
        db.insert_transaction(&newer).await.unwrap();

        let listed = db.list_transactions(user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn test_range_query_is_inclusive_on_both_ends() {
        let db = setup_test().await;
        let user = insert_test_user(&db, "ada@example.com").await;

        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();

        let at_start = test_transaction(user.id, 1.0, start);
        let at_end = test_transaction(user.id, 2.0, end);
        let before = test_transaction(user.id, 3.0, start - chrono::Duration::seconds(1));
        let after = test_transaction(user.id, 4.0, end + chrono::Duration::seconds(1));
        for tx in [&at_start, &at_end, &before, &after] {
            db.insert_transaction(tx).await.unwrap();
        }

        let in_range = db.transactions_in_range(user.id, start, end).await.unwrap();
        let ids: Vec<Uuid> = in_range.iter().map(|t| t.id).collect();
        assert_eq!(in_range.len(), 2);
        assert!(ids.contains(&at_start.id));
        assert!(ids.contains(&at_end.id));
    }

    #[tokio::test]
    async fn test_range_query_never_crosses_owners() {
        let db = setup_test().await;
        let ada = insert_test_user(&db, "ada@example.com").await;
        let bob = insert_test_user(&db, "bob@example.com").await;

        let date = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        db.insert_transaction(&test_transaction(ada.id, 10.0, date))
            .await
            .unwrap();
        db.insert_transaction(&test_transaction(bob.id, 99.0, date))
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        let adas = db.transactions_in_range(ada.id, start, end).await.unwrap();
        assert_eq!(adas.len(), 1);
        assert_eq!(adas[0].owner_id, ada.id);
        assert_eq!(adas[0].amount, 10.0);
    }

    #[tokio::test]
    async fn test_budgets_round_trip_newest_first() {
        let db = setup_test().await;
        let user = insert_test_user(&db, "ada@example.com").await;

        let older = Budget {
            id: Uuid::new_v4(),
            owner_id: user.id,
            amount: 300.0,
            category: "Groceries".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
        };
        let newer = Budget {
            id: Uuid::new_v4(),
            owner_id: user.id,
            amount: 120.0,
            category: "Transport".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap(),
        };
        db.insert_budget(&older).await.unwrap();
        db.insert_budget(&newer).await.unwrap();

        let listed = db.list_budgets(user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].category, "Transport");
        assert_eq!(listed[1].category, "Groceries");
        assert_eq!(listed[1].amount, 300.0);
    }
}
