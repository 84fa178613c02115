//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use foodgram_core::{
    FavoriteService, FollowService, IngredientService, RecipeService, ShoppingCartService,
    ShoppingListService, TagService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub ingredient_service: IngredientService,
    pub tag_service: TagService,
    pub recipe_service: RecipeService,
    pub favorite_service: FavoriteService,
    pub shopping_cart_service: ShoppingCartService,
    pub follow_service: FollowService,
    pub shopping_list_service: ShoppingListService,
}

/// Token authentication middleware.
///
/// Resolves `Authorization: Token <key>` (or `Bearer <key>`) to a user and
/// stores it in the request extensions. An invalid or absent token leaves
/// the request anonymous; endpoints that require a user reject it there.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
    {
        let token = auth_str
            .strip_prefix("Token ")
            .or_else(|| auth_str.strip_prefix("Bearer "));
        if let Some(token) = token
            && let Ok(user) = state.user_service.authenticate(token).await
        {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
