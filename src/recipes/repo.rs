use sqlx::{Sqlite, SqlitePool, Transaction};

pub use crate::recipes::repo_types::{NewRecipe, Recipe};
use crate::recipes::repo_types::RecipeWithOwnerRow;
use crate::error::{AppError, Result};

const SELECT_WITH_OWNER: &str = r#"
    SELECT r.id, r.title, r.instructions, r.minutes_to_complete, r.user_id,
           u.username, u.image_url, u.bio
      FROM recipes r
      JOIN users u ON u.id = r.user_id
"#;

/// Every recipe with its owner summary, in insertion order.
pub async fn list_with_owners(db: &SqlitePool) -> Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeWithOwnerRow>(&format!("{SELECT_WITH_OWNER} ORDER BY r.id"))
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Recipe::from).collect())
}

/// Insert one recipe and read it back with its owner inside a transaction.
/// Constraint failures (missing title, unknown owner) roll back and surface
/// as `AppError::Integrity`.
pub async fn create(db: &SqlitePool, new: NewRecipe<'_>) -> Result<Recipe> {
    let mut tx = db.begin().await?;
    let id = insert_recipe_tx(&mut tx, &new).await?;

    let row = sqlx::query_as::<_, RecipeWithOwnerRow>(&format!("{SELECT_WITH_OWNER} WHERE r.id = ?1"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row.into())
}

async fn insert_recipe_tx(tx: &mut Transaction<'_, Sqlite>, new: &NewRecipe<'_>) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id
        "#,
    )
    .bind(new.title)
    .bind(new.instructions)
    .bind(new.minutes_to_complete)
    .bind(new.user_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| AppError::from_db(e, "Recipe data is invalid"))?;
    Ok(id)
}
