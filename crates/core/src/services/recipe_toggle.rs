//! Favorite and shopping-cart services.
//!
//! Both are toggle edges from a user to a recipe with identical semantics,
//! so one generic service covers them; the aliases at the bottom pin the
//! edge entity.

use foodgram_common::AppResult;
use foodgram_db::{
    entities::{favorite, recipe, shopping_cart},
    repositories::{RecipeRepository, ToggleEdge, ToggleRepository},
};
use sea_orm::{ActiveModelBehavior, IntoActiveModel};

/// Toggle service over a user -> recipe edge.
#[derive(Clone)]
pub struct RecipeToggleService<E: ToggleEdge> {
    edges: ToggleRepository<E>,
    recipe_repo: RecipeRepository,
}

impl<E> RecipeToggleService<E>
where
    E: ToggleEdge,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    /// Create a new toggle service.
    #[must_use]
    pub const fn new(edges: ToggleRepository<E>, recipe_repo: RecipeRepository) -> Self {
        Self { edges, recipe_repo }
    }

    /// Add the edge for a recipe, returning the recipe for the response
    /// summary.
    ///
    /// A missing recipe is `NotFound`; an already-present edge is
    /// `Conflict` (surfaced by the unique index, so concurrent duplicate
    /// adds cannot both succeed).
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<recipe::Model> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        self.edges.add(user_id, recipe_id).await?;
        Ok(recipe)
    }

    /// Remove the edge; `NotFound` when it was absent.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        self.edges.remove(user_id, recipe_id).await
    }

    /// Whether the viewer has the edge. Anonymous viewers never do.
    pub async fn contains(&self, viewer: Option<&str>, recipe_id: &str) -> AppResult<bool> {
        match viewer {
            Some(user_id) => self.edges.exists(user_id, recipe_id).await,
            None => Ok(false),
        }
    }

    /// Recipe ids the user has the edge for, newest edge first.
    pub async fn recipes_of(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.edges.targets_of(user_id).await
    }
}

/// Favorites: user -> recipe.
pub type FavoriteService = RecipeToggleService<favorite::Entity>;
/// Shopping cart: user -> recipe.
pub type ShoppingCartService = RecipeToggleService<shopping_cart::Entity>;
