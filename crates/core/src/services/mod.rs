//! Business-logic services.

mod follow;
mod ingredient;
mod recipe;
mod recipe_toggle;
mod shopping_list;
mod tag;
mod user;

pub use follow::{FollowService, Subscription};
pub use ingredient::{IngredientSeed, IngredientService};
pub use recipe::{
    IngredientAmountInput, IngredientLine, RecipeDetail, RecipeFilters, RecipeInput, RecipeService,
};
pub use recipe_toggle::{FavoriteService, RecipeToggleService, ShoppingCartService};
pub use shopping_list::ShoppingListService;
pub use tag::{TagSeed, TagService};
pub use user::{UserProfile, UserService};
