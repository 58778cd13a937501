//! # User Repository
//!
//! Users are keyed by their external (Google) subject, which is also the
//! `sub` claim of their session token. Login itself lives outside this
//! service; rows are created by the seed binary or an upstream sign-in.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use boutique_core::validation::validate_identifier;
use boutique_core::User;

const USER_COLUMNS: &str = "google_id, email, first_name, last_name, is_admin, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates the user or refreshes their profile fields.
    pub async fn upsert(
        &self,
        google_id: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        is_admin: bool,
    ) -> DbResult<User> {
        validate_identifier("google_id", google_id)?;
        validate_identifier("email", email)?;

        debug!(google_id = %google_id, email = %email, "Upserting user");

        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (google_id, email, first_name, last_name, is_admin, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT (google_id) DO UPDATE SET
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                is_admin = excluded.is_admin,
                updated_at = excluded.updated_at
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(google_id)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(is_admin)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_google_id(&self, google_id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = ?1"
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let created = users
            .upsert("g-1", "anne@example.com", Some("Anne"), Some("Martin"), false)
            .await
            .unwrap();
        assert!(!created.is_admin);
        assert_eq!(created.first_name.as_deref(), Some("Anne"));

        let promoted = users
            .upsert("g-1", "anne@example.com", Some("Anne"), Some("Martin"), true)
            .await
            .unwrap();
        assert!(promoted.is_admin);
        assert_eq!(promoted.created_at, created.created_at);

        let by_email = users.get_by_email("anne@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.google_id, "g-1");
        assert!(users.get_by_google_id("g-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        users.upsert("g-1", "same@example.com", None, None, false).await.unwrap();
        let err = users
            .upsert("g-2", "same@example.com", None, None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
