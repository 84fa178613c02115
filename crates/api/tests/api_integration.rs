//! API integration tests.
//!
//! Drive the full router (auth middleware included) against mock database
//! connections, one per repository.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware, Router,
};
use chrono::Utc;
use foodgram_api::{auth_middleware, router, AppState};
use foodgram_core::{
    FavoriteService, FollowService, IngredientService, RecipeService, ShoppingCartService,
    ShoppingListService, TagService, UserService,
};
use foodgram_db::{
    entities::{tag, user},
    repositories::{
        FavoriteRepository, FollowRepository, IngredientRepository, RecipeRepository,
        ShoppingCartRepository, TagRepository, UserRepository,
    },
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;

fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

struct MockDbs {
    user: Arc<DatabaseConnection>,
    ingredient: Arc<DatabaseConnection>,
    tag: Arc<DatabaseConnection>,
    recipe: Arc<DatabaseConnection>,
}

impl Default for MockDbs {
    fn default() -> Self {
        Self {
            user: empty_db(),
            ingredient: empty_db(),
            tag: empty_db(),
            recipe: empty_db(),
        }
    }
}

fn app(dbs: MockDbs) -> Router {
    let user_repo = UserRepository::new(Arc::clone(&dbs.user));
    let ingredient_repo = IngredientRepository::new(Arc::clone(&dbs.ingredient));
    let tag_repo = TagRepository::new(Arc::clone(&dbs.tag));
    let recipe_repo = RecipeRepository::new(Arc::clone(&dbs.recipe));
    let favorite_repo = FavoriteRepository::new(empty_db());
    let cart_repo = ShoppingCartRepository::new(empty_db());
    let follow_repo = FollowRepository::new(empty_db());

    let state = AppState {
        user_service: UserService::new(user_repo.clone(), follow_repo.clone()),
        ingredient_service: IngredientService::new(ingredient_repo.clone()),
        tag_service: TagService::new(tag_repo.clone()),
        recipe_service: RecipeService::new(
            recipe_repo.clone(),
            ingredient_repo,
            tag_repo,
            user_repo,
            favorite_repo.clone(),
            cart_repo.clone(),
            follow_repo.clone(),
        ),
        favorite_service: FavoriteService::new(favorite_repo, recipe_repo.clone()),
        shopping_cart_service: ShoppingCartService::new(cart_repo.clone(), recipe_repo.clone()),
        follow_service: FollowService::new(follow_repo, UserRepository::new(empty_db()), recipe_repo.clone()),
        shopping_list_service: ShoppingListService::new(cart_repo, recipe_repo),
    };

    Router::new()
        .nest("/api", router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn test_user(id: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: "chef".to_string(),
        email: "chef@example.com".to_string(),
        first_name: "Test".to_string(),
        last_name: "Chef".to_string(),
        token: Some(token.to_string()),
        created_at: Utc::now().into(),
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_list_tags() {
    let breakfast = tag::Model {
        id: "t1".to_string(),
        name: "Breakfast".to_string(),
        color: "#49B64E".to_string(),
        slug: "breakfast".to_string(),
    };
    let dbs = MockDbs {
        tag: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[breakfast]])
                .into_connection(),
        ),
        ..Default::default()
    };

    let response = app(dbs)
        .oneshot(
            Request::builder()
                .uri("/api/tags/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("breakfast"));
}

#[tokio::test]
async fn test_missing_ingredient_is_404() {
    let dbs = MockDbs {
        ingredient: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<foodgram_db::entities::ingredient::Model>::new()])
                .into_connection(),
        ),
        ..Default::default()
    };

    let response = app(dbs)
        .oneshot(
            Request::builder()
                .uri("/api/ingredients/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shopping_list_download_requires_auth() {
    let response = app(MockDbs::default())
        .oneshot(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_recipe_requires_auth() {
    let response = app(MockDbs::default())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recipes/")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_token() {
    // One query resolves the token, one loads the profile.
    let dbs = MockDbs {
        user: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    vec![test_user("u1", "secret")],
                    vec![test_user("u1", "secret")],
                ])
                .into_connection(),
        ),
        ..Default::default()
    };

    let response = app(dbs)
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", "Token secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("chef"));
}

#[tokio::test]
async fn test_invalid_token_is_anonymous() {
    // Token resolves to nothing; the protected endpoint rejects.
    let dbs = MockDbs {
        user: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        ),
        ..Default::default()
    };

    let response = app(dbs)
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", "Token wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
