use serde::{Deserialize, Serialize};

use super::repo::User;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for login. `password` may be omitted.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// User summary returned by signup, login and embedded in recipes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Shape returned by `/check_session`, keyed by `id` instead of `user_id`.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            user_id: u.id,
            username: u.username,
            image_url: u.image_url,
            bio: u.bio,
        }
    }
}

impl From<User> for SessionUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            image_url: u.image_url,
            bio: u.bio,
        }
    }
}
