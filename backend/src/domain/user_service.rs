use anyhow::anyhow;
use chrono::Utc;
use shared::{LoginRequest, RegisterRequest, UserProfile};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::db::{DbConnection, UserRecord};
use crate::domain::DomainError;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct UserService {
    db: DbConnection,
}

impl UserService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserRecord, DomainError> {
        validate_registration(&request)?;

        if self.db.find_user_by_email(&request.email).await?.is_some() {
            return Err(DomainError::EmailTaken);
        }

        let password_hash = auth::hash_password(&request.password)
            .map_err(|e| DomainError::Store(anyhow!("password hashing failed: {e}")))?;

        let user = UserRecord {
            id: Uuid::new_v4(),
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            created_at: Utc::now(),
        };
        self.db.insert_user(&user).await?;
        info!("Registered user {} ({})", user.id, user.email);

        Ok(user)
    }

    /// Verify credentials. Both an unknown email and a wrong password yield
    /// the same error so the response does not reveal which one failed.
    pub async fn login(&self, request: LoginRequest) -> Result<UserRecord, DomainError> {
        let Some(user) = self.db.find_user_by_email(&request.email).await? else {
            return Err(DomainError::InvalidCredentials);
        };

        let valid = auth::verify_password(&request.password, &user.password_hash)
            .map_err(|e| DomainError::Store(anyhow!("password verification failed: {e}")))?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, DomainError> {
        let Some(user) = self.db.find_user_by_id(user_id).await? else {
            return Err(DomainError::UserNotFound);
        };

        Ok(UserProfile {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        })
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<(), DomainError> {
    if !is_valid_email(&request.email) {
        return Err(DomainError::Validation(
            "Please include a valid email".to_string(),
        ));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if request.first_name.is_empty() {
        return Err(DomainError::Validation("First name is required".to_string()));
    }
    if request.last_name.is_empty() {
        return Err(DomainError::Validation("Last name is required".to_string()));
    }
    Ok(())
}

/// Minimal shape check: `local@domain.tld`, no whitespace, exactly one `@`,
/// and a dot somewhere inside the domain.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
