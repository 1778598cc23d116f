use sqlx::SqlitePool;

use crate::auth::password::PasswordDigest;
pub use crate::auth::repo_types::{NewUser, User};
use crate::auth::repo_types::UserRow;
use crate::error::{AppError, Result};

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, image_url, bio
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(row.map(User::from))
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, image_url, bio
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row.map(User::from))
    }

    /// Create a new user, hashing the password first. A taken or empty
    /// username comes back as `AppError::Integrity`.
    pub async fn create(db: &SqlitePool, new: NewUser<'_>) -> Result<User> {
        if new.username.is_empty() {
            return Err(AppError::Validation("422 Unprocessable Entity".into()));
        }

        let digest = PasswordDigest::from_plaintext(new.password)
            .map_err(|e| AppError::Internal(e.into()))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, image_url, bio)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, username, password_hash, image_url, bio
            "#,
        )
        .bind(new.username)
        .bind(digest.stored())
        .bind(new.image_url)
        .bind(new.bio)
        .fetch_one(db)
        .await
        .map_err(|e| AppError::from_db(e, "Username is already taken"))?;

        Ok(row.into())
    }
}
