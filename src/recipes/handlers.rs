use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::session::CurrentUser,
    error::{AppError, Result},
    state::AppState,
};

use super::dto::{check_instructions, CreateRecipeRequest};
use super::repo::{self, NewRecipe, Recipe};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Recipe>>> {
    let recipes = repo::list_with_owners(&state.db).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: std::result::Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>)> {
    let Json(body) = payload?;

    if state.config.policy.enforce_instructions {
        if let Err(msg) = check_instructions(body.instructions.as_deref()) {
            warn!(user_id, %msg, "recipe instructions rejected");
            return Err(AppError::Validation(msg));
        }
    }

    let recipe = repo::create(
        &state.db,
        NewRecipe {
            user_id,
            title: body.title.as_deref(),
            instructions: body.instructions.as_deref(),
            minutes_to_complete: body.minutes_to_complete,
        },
    )
    .await?;

    info!(user_id, recipe_id = recipe.id, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::config::PolicyConfig;
    use crate::state::AppState;
    use crate::test_support::TestClient;

    async fn signed_in(state: &AppState, username: &str) -> TestClient {
        let mut client = TestClient::new(state.clone());
        let (status, _) = client
            .post("/signup", json!({"username": username, "password": "pw", "bio": "cook"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        client
    }

    async fn recipe_count(state: &AppState) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
            .fetch_one(&state.db)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn unauthenticated_access_is_401_and_persists_nothing() {
        let state = AppState::fake().await;
        let mut client = TestClient::new(state.clone());

        let (status, body) = client.get("/recipes").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, body) = client.post("/recipes", json!({"title": "Soup"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(recipe_count(&state).await, 0);
    }

    #[tokio::test]
    async fn create_recipe_embeds_owner_summary() {
        let state = AppState::fake().await;
        let mut client = signed_in(&state, "ana").await;

        let (status, body) = client
            .post(
                "/recipes",
                json!({"title": "Soup", "instructions": "Boil water.", "minutes_to_complete": 15}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "Soup");
        assert_eq!(body["instructions"], "Boil water.");
        assert_eq!(body["minutes_to_complete"], 15);
        assert_eq!(body["user"]["username"], "ana");
        assert_eq!(body["user"]["bio"], "cook");
        assert!(body["user"]["user_id"].as_i64().unwrap() > 0);
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(recipe_count(&state).await, 1);
    }

    #[tokio::test]
    async fn missing_title_is_422() {
        let state = AppState::fake().await;
        let mut client = signed_in(&state, "ana").await;

        let (status, body) = client.post("/recipes", json!({"instructions": "x"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Recipe data is invalid");
        assert_eq!(recipe_count(&state).await, 0);
    }

    #[tokio::test]
    async fn short_instructions_are_accepted_by_default() {
        // Matches the live behaviour: the 50-character rule is opt-in.
        let state = AppState::fake().await;
        let mut client = signed_in(&state, "ana").await;

        let (status, body) = client.post("/recipes", json!({"title": "Toast"})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["instructions"].is_null());
        assert!(body["minutes_to_complete"].is_null());
    }

    #[tokio::test]
    async fn instructions_rule_applies_when_enabled() {
        let state = AppState::fake_with(PolicyConfig {
            enforce_instructions: true,
            ..PolicyConfig::default()
        })
        .await;
        let mut client = signed_in(&state, "ana").await;

        let (status, body) = client
            .post("/recipes", json!({"title": "Toast", "instructions": "Toast it."}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("50"));
        assert_eq!(recipe_count(&state).await, 0);

        let long = "Slice the bread, toast it until golden, then butter generously.";
        let (status, _) = client
            .post("/recipes", json!({"title": "Toast", "instructions": long}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn session_for_deleted_owner_is_integrity_error() {
        let state = AppState::fake().await;
        let mut client = signed_in(&state, "ana").await;
        sqlx::query("DELETE FROM users").execute(&state.db).await.unwrap();

        let (status, _) = client.post("/recipes", json!({"title": "Soup"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(recipe_count(&state).await, 0);
    }

    #[tokio::test]
    async fn store_failure_on_create_is_500_with_error_text() {
        let state = AppState::fake().await;
        let mut client = signed_in(&state, "ana").await;
        state.db.close().await;

        let (status, body) = client.post("/recipes", json!({"title": "Soup"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_all_recipes_with_owners() {
        let state = AppState::fake().await;
        let mut ana = signed_in(&state, "ana").await;
        let mut bo = signed_in(&state, "bo").await;

        ana.post("/recipes", json!({"title": "Soup"})).await;
        bo.post("/recipes", json!({"title": "Bread"})).await;
        ana.post("/recipes", json!({"title": "Salad"})).await;

        let (status, body) = bo.get("/recipes").await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 3);

        let mut pairs: Vec<(String, String)> = items
            .iter()
            .map(|r| {
                (
                    r["title"].as_str().unwrap().to_string(),
                    r["user"]["username"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("Bread".to_string(), "bo".to_string()),
                ("Salad".to_string(), "ana".to_string()),
                ("Soup".to_string(), "ana".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn logged_out_client_cannot_create() {
        let state = AppState::fake().await;
        let mut client = signed_in(&state, "ana").await;
        let (status, _) = client.delete("/logout").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = client.post("/recipes", json!({"title": "Soup"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(recipe_count(&state).await, 0);
    }
}
