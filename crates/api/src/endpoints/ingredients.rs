//! Ingredient catalog endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use foodgram_common::AppResult;
use foodgram_db::entities::ingredient;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Ingredient response.
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.unit,
        }
    }
}

/// List ingredients request.
#[derive(Debug, Deserialize)]
pub struct ListIngredientsRequest {
    /// Case-insensitive name substring.
    pub name: Option<String>,
}

/// List the catalog, optionally narrowed by a name search.
async fn list(
    State(state): State<AppState>,
    Query(req): Query<ListIngredientsRequest>,
) -> AppResult<ApiResponse<Vec<IngredientResponse>>> {
    let ingredients = state.ingredient_service.list(req.name.as_deref()).await?;
    Ok(ApiResponse::ok(
        ingredients.into_iter().map(Into::into).collect(),
    ))
}

/// Get an ingredient by id.
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<IngredientResponse>> {
    let ingredient = state.ingredient_service.get(&id).await?;
    Ok(ApiResponse::ok(ingredient.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_one))
}
