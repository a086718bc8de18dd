// src/users/directory.rs
//! User directory backed by the users table
//!
//! One operation: resolve a verified provider identity to exactly one user
//! row. The uniqueness invariants (email, google_id) live in the schema, so
//! a double-submitted callback merges onto the first writer's row instead of
//! creating a duplicate.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::common::safe_email_log;
use crate::services::GoogleIdentity;
use crate::users::User;

#[derive(Debug, Clone)]
pub struct UserDirectory {
    db: SqlitePool,
}

impl UserDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Find-or-create-or-update a user from a provider assertion
    ///
    /// Resolution order: google subject id if already observed, else email,
    /// else create. Profile fields are refreshed from the assertion; existing
    /// non-null values are preserved when the provider omits a field, and
    /// email_verified never flips back to false.
    pub async fn upsert_from_identity(
        &self,
        identity: &GoogleIdentity,
    ) -> Result<User, sqlx::Error> {
        if let Some(existing) = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE google_id = ?",
        )
        .bind(&identity.subject)
        .fetch_optional(&self.db)
        .await?
        {
            debug!(
                user_id = %existing.id,
                google_id = %identity.subject,
                "Found existing user by subject id"
            );

            return sqlx::query_as::<_, User>(
                r#"
                UPDATE users SET
                    name = COALESCE(?, name),
                    avatar_url = COALESCE(?, avatar_url),
                    email_verified = MAX(email_verified, ?),
                    updated_at = datetime('now')
                WHERE id = ?
                RETURNING *
                "#,
            )
            .bind(identity.name.as_deref())
            .bind(identity.avatar_url.as_deref())
            .bind(identity.email_verified)
            .bind(&existing.id)
            .fetch_one(&self.db)
            .await;
        }

        // First sign-in for this subject: insert, or merge onto the row that
        // already owns the email. Atomic with respect to the unique
        // constraint, so a concurrent duplicate callback lands here too.
        let id = Uuid::new_v4().to_string();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, avatar_url, google_id, email_verified)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                google_id = excluded.google_id,
                name = COALESCE(excluded.name, users.name),
                avatar_url = COALESCE(excluded.avatar_url, users.avatar_url),
                email_verified = MAX(users.email_verified, excluded.email_verified),
                updated_at = datetime('now')
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&identity.email)
        .bind(identity.name.as_deref())
        .bind(identity.avatar_url.as_deref())
        .bind(&identity.subject)
        .bind(identity.email_verified)
        .fetch_one(&self.db)
        .await?;

        if user.id == id {
            info!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                "Created new user account via Google sign-in"
            );
        } else {
            debug!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                "Merged sign-in onto existing user by email"
            );
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool, false).await.unwrap();
        pool
    }

    fn identity() -> GoogleIdentity {
        GoogleIdentity {
            subject: "117000000000000000001".to_string(),
            email: "jane@example.com".to_string(),
            email_verified: true,
            name: Some("Jane Doe".to_string()),
            avatar_url: Some("https://lh3.googleusercontent.com/a/photo".to_string()),
        }
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_exactly_one_row() {
        let directory = UserDirectory::new(setup_test_db().await);

        let user = directory.upsert_from_identity(&identity()).await.unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.google_id.as_deref(), Some("117000000000000000001"));
        assert!(user.email_verified);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&directory.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_repeat_sign_in_keeps_stable_id() {
        let directory = UserDirectory::new(setup_test_db().await);

        let first = directory.upsert_from_identity(&identity()).await.unwrap();
        let second = directory.upsert_from_identity(&identity()).await.unwrap();

        assert_eq!(first.id, second.id);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&directory.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_omitted_fields_preserve_existing_values() {
        let directory = UserDirectory::new(setup_test_db().await);
        directory.upsert_from_identity(&identity()).await.unwrap();

        let sparse = GoogleIdentity {
            name: None,
            avatar_url: None,
            email_verified: false,
            ..identity()
        };
        let user = directory.upsert_from_identity(&sparse).await.unwrap();

        assert_eq!(user.name.as_deref(), Some("Jane Doe"));
        assert!(user.avatar_url.is_some());
        // Verified flag never regresses
        assert!(user.email_verified);
    }

    #[tokio::test]
    async fn test_subject_id_wins_over_changed_email() {
        let directory = UserDirectory::new(setup_test_db().await);
        let first = directory.upsert_from_identity(&identity()).await.unwrap();

        let renamed = GoogleIdentity {
            email: "jane.doe@example.org".to_string(),
            name: Some("Jane D.".to_string()),
            ..identity()
        };
        let user = directory.upsert_from_identity(&renamed).await.unwrap();

        assert_eq!(user.id, first.id);
        assert_eq!(user.name.as_deref(), Some("Jane D."));
        // Email stays the durable join key
        assert_eq!(user.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_email_match_attaches_subject_to_existing_row() {
        let directory = UserDirectory::new(setup_test_db().await);

        // Row created without this subject (e.g. seeded before first sign-in)
        sqlx::query("INSERT INTO users (id, email) VALUES ('seed-id', 'jane@example.com')")
            .execute(&directory.db)
            .await
            .unwrap();

        let user = directory.upsert_from_identity(&identity()).await.unwrap();
        assert_eq!(user.id, "seed-id");
        assert_eq!(user.google_id.as_deref(), Some("117000000000000000001"));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_resolve_to_one_row() {
        let directory = UserDirectory::new(setup_test_db().await);

        let identity_a = identity();
        let identity_b = identity();
        let (a, b) = tokio::join!(
            directory.upsert_from_identity(&identity_a),
            directory.upsert_from_identity(&identity_b),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.id, b.id);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&directory.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }
}
