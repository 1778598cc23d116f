use sqlx::FromRow;

use super::password::{CredentialError, PasswordDigest};

/// Raw `users` row as stored.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// User record. The password can only be verified against plaintext,
/// never read back.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    password: PasswordDigest,
}

impl User {
    pub fn authenticate(&self, plain: &str) -> bool {
        self.password.verify(plain)
    }

    /// Always fails.
    pub fn password_hash(&self) -> Result<&str, CredentialError> {
        Err(CredentialError::ViewDenied)
    }
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            image_url: r.image_url,
            bio: r.bio,
            password: PasswordDigest::from_stored(r.password_hash),
        }
    }
}

/// Fields accepted when creating a user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub bio: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub password: &'a str,
}
