//! Recipe endpoints: the catalog, the per-user favorite / shopping-cart
//! toggles and the shopping-list download.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use foodgram_common::AppResult;
use foodgram_core::{RecipeDetail, RecipeFilters, RecipeInput};
use foodgram_db::entities::{recipe, user};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::tags::TagResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{no_content, ApiResponse},
};

const DEFAULT_PAGE_SIZE: usize = 6;
const SHOPPING_LIST_FILENAME: &str = "foodgram_shopping_cart.txt";

/// Recipe author as seen by the viewer.
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl AuthorResponse {
    fn new(user: user::Model, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// One ingredient line of a recipe.
#[derive(Debug, Serialize)]
pub struct RecipeLineResponse {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe response.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: String,
    pub tags: Vec<TagResponse>,
    pub author: AuthorResponse,
    pub ingredients: Vec<RecipeLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: String,
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.recipe.id,
            tags: detail.tags.into_iter().map(Into::into).collect(),
            author: AuthorResponse::new(detail.author, detail.is_subscribed),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(|line| RecipeLineResponse {
                    id: line.id,
                    name: line.name,
                    measurement_unit: line.unit,
                    amount: line.amount,
                })
                .collect(),
            is_favorited: detail.is_favorited,
            is_in_shopping_cart: detail.is_in_shopping_cart,
            name: detail.recipe.name,
            image: detail.recipe.image,
            text: detail.recipe.text,
            cooking_time: detail.recipe.cooking_time,
            created_at: detail.recipe.created_at.to_rfc3339(),
        }
    }
}

/// Short recipe response for toggle endpoints and subscription previews.
#[derive(Debug, Serialize)]
pub struct RecipeSummaryResponse {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<recipe::Model> for RecipeSummaryResponse {
    fn from(recipe: recipe::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// List recipes request.
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesRequest {
    pub author: Option<String>,
    /// Comma-separated tag slugs, matched with OR semantics.
    pub tags: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Paginated listing.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    /// Total matches before pagination.
    pub count: usize,
    pub results: Vec<T>,
}

/// Truthy query-flag values are `1` and `true` in any letter case;
/// everything else (including absence) reads as false.
fn flag_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true"))
}

fn parse_tags(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|raw| {
        raw.split(',')
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

/// List recipes, newest-published first.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(req): Query<ListRecipesRequest>,
) -> AppResult<ApiResponse<PageResponse<RecipeResponse>>> {
    let filters = RecipeFilters {
        author: req.author,
        tag_slugs: parse_tags(req.tags.as_deref()),
        favorited_only: flag_set(req.is_favorited.as_deref()),
        in_cart_only: flag_set(req.is_in_shopping_cart.as_deref()),
    };
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());

    let recipes = state.recipe_service.list(&filters, viewer_id).await?;
    let count = recipes.len();

    let limit = req.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = req.page.unwrap_or(1).max(1);
    let page_of: Vec<recipe::Model> = recipes
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    let details = state.recipe_service.details(page_of, viewer_id).await?;
    Ok(ApiResponse::ok(PageResponse {
        count,
        results: details.into_iter().map(Into::into).collect(),
    }))
}

/// Publish a recipe.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecipeInput>,
) -> AppResult<ApiResponse<RecipeResponse>> {
    let recipe = state.recipe_service.create(&user.id, input).await?;
    let detail = state
        .recipe_service
        .detail(&recipe.id, Some(&user.id))
        .await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Get one recipe.
async fn get_one(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeResponse>> {
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    let detail = state.recipe_service.detail(&id, viewer_id).await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Update a recipe (author only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RecipeInput>,
) -> AppResult<ApiResponse<RecipeResponse>> {
    state.recipe_service.update(&id, &user.id, input).await?;
    let detail = state.recipe_service.detail(&id, Some(&user.id)).await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Delete a recipe (author only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.recipe_service.delete(&id, &user.id).await?;
    Ok(no_content())
}

/// Add a recipe to favorites.
async fn favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeSummaryResponse>> {
    let recipe = state.favorite_service.add(&user.id, &id).await?;
    Ok(ApiResponse::ok(recipe.into()))
}

/// Remove a recipe from favorites.
async fn unfavorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.favorite_service.remove(&user.id, &id).await?;
    Ok(no_content())
}

/// Add a recipe to the shopping cart.
async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeSummaryResponse>> {
    let recipe = state.shopping_cart_service.add(&user.id, &id).await?;
    Ok(ApiResponse::ok(recipe.into()))
}

/// Remove a recipe from the shopping cart.
async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.shopping_cart_service.remove(&user.id, &id).await?;
    Ok(no_content())
}

/// Download the aggregated shopping list as a plain-text attachment.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let document = state.shopping_list_service.render(&user.id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        document,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route("/{id}", get(get_one).patch(update).delete(delete))
        .route("/{id}/favorite", post(favorite).delete(unfavorite))
        .route("/{id}/shopping_cart", post(add_to_cart).delete(remove_from_cart))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_set() {
        assert!(flag_set(Some("1")));
        assert!(flag_set(Some("true")));
        assert!(flag_set(Some("True")));
        assert!(flag_set(Some("TRUE")));
        assert!(!flag_set(Some("0")));
        assert!(!flag_set(Some("false")));
        assert!(!flag_set(Some("yes")));
        assert!(!flag_set(Some("on")));
        assert!(!flag_set(None));
    }

    #[test]
    fn test_parse_tags_splits_and_drops_empty() {
        assert_eq!(
            parse_tags(Some("breakfast,,dinner")),
            Some(vec!["breakfast".to_string(), "dinner".to_string()])
        );
        assert_eq!(parse_tags(None), None);
    }
}
