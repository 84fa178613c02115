//! User profile and subscription endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use foodgram_common::AppResult;
use foodgram_core::{Subscription, UserProfile};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::recipes::RecipeSummaryResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{no_content, ApiResponse},
};

/// User profile response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.user.id,
            username: profile.user.username,
            email: profile.user.email,
            first_name: profile.user.first_name,
            last_name: profile.user.last_name,
            is_subscribed: profile.is_subscribed,
        }
    }
}

/// Followed author with a recipe preview.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.author.id,
            username: sub.author.username,
            email: sub.author.email,
            first_name: sub.author.first_name,
            last_name: sub.author.last_name,
            is_subscribed: true,
            recipes: sub.recipes.into_iter().map(Into::into).collect(),
            recipes_count: sub.recipes_count,
        }
    }
}

/// Subscription listing request.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsRequest {
    /// Truncate each author's recipe preview.
    pub recipes_limit: Option<usize>,
}

/// Current user's profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let profile = state.user_service.profile(&user.id, Some(&user.id)).await?;
    Ok(ApiResponse::ok(profile.into()))
}

/// A user's profile as seen by the viewer.
async fn get_one(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let profile = state.user_service.profile(&id, viewer.viewer()).await?;
    Ok(ApiResponse::ok(profile.into()))
}

/// Authors the current user follows.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(req): Query<SubscriptionsRequest>,
) -> AppResult<ApiResponse<Vec<SubscriptionResponse>>> {
    let subs = state
        .follow_service
        .subscriptions(&user.id, req.recipes_limit)
        .await?;
    Ok(ApiResponse::ok(subs.into_iter().map(Into::into).collect()))
}

/// Follow an author.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(req): Query<SubscriptionsRequest>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let sub = state
        .follow_service
        .subscribe(&user.id, &id, req.recipes_limit)
        .await?;
    Ok(ApiResponse::ok(sub.into()))
}

/// Unfollow an author.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.follow_service.unsubscribe(&user.id, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/subscriptions", get(subscriptions))
        .route("/{id}", get(get_one))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}
