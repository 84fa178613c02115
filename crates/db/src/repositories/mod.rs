//! Database repositories.

mod ingredient;
mod recipe;
mod tag;
mod toggle;
mod user;

pub use ingredient::IngredientRepository;
pub use recipe::{JoinedLine, JoinedLink, RecipeListQuery, RecipeRepository};
pub use tag::TagRepository;
pub use toggle::{
    FavoriteRepository, FollowRepository, ShoppingCartRepository, ToggleEdge, ToggleRepository,
};
pub use user::UserRepository;
