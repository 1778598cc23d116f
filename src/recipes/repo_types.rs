use serde::Serialize;
use sqlx::FromRow;

use crate::auth::dto::UserSummary;

/// A recipe joined with the summary of its owner, as read in one query.
#[derive(Debug, FromRow)]
pub struct RecipeWithOwnerRow {
    pub id: i64,
    pub title: String,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
    pub user_id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    #[serde(skip_serializing)]
    pub id: i64,
    pub title: String,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
    pub user: UserSummary,
}

impl From<RecipeWithOwnerRow> for Recipe {
    fn from(r: RecipeWithOwnerRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            instructions: r.instructions,
            minutes_to_complete: r.minutes_to_complete,
            user: UserSummary {
                user_id: r.user_id,
                username: r.username,
                image_url: r.image_url,
                bio: r.bio,
            },
        }
    }
}

/// Fields accepted when creating a recipe.
#[derive(Debug)]
pub struct NewRecipe<'a> {
    pub user_id: i64,
    pub title: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub minutes_to_complete: Option<i64>,
}
