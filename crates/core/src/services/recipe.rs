//! Recipe service.
//!
//! Owns the recipe aggregate: scalar fields plus the composed ingredient
//! lines and tag links. Create/update/delete validate and authorize before
//! touching storage, and every write commits the whole aggregate in one
//! transaction.

use std::collections::{HashMap, HashSet};

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{recipe, recipe_ingredient, recipe_tag, tag, user},
    repositories::{
        FavoriteRepository, FollowRepository, IngredientRepository, RecipeListQuery,
        RecipeRepository, ShoppingCartRepository, TagRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Write model for recipe create/update.
///
/// Update is a full replace: the submitted ingredient and tag sets become
/// the recipe's collections, whatever was there before.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, max = 256, message = "name must be 1-256 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "description must not be empty"))]
    pub text: String,

    /// Minutes; must be positive.
    #[validate(range(min = 1, message = "cooking time must be at least 1"))]
    pub cooking_time: i32,

    /// Opaque image reference, already stored by the upstream layer.
    pub image: String,

    #[validate(length(min = 1, message = "at least one ingredient is required"), nested)]
    pub ingredients: Vec<IngredientAmountInput>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// One submitted ingredient line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngredientAmountInput {
    /// Ingredient catalog id.
    pub id: String,

    #[validate(range(min = 1, message = "amount must be at least 1"))]
    pub amount: i32,
}

/// Filters for recipe listings.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    /// Exact author match.
    pub author: Option<String>,
    /// OR-matched tag slugs.
    pub tag_slugs: Option<Vec<String>>,
    /// Keep only recipes the viewer favorited. Ignored for anonymous viewers.
    pub favorited_only: bool,
    /// Keep only recipes in the viewer's cart. Ignored for anonymous viewers.
    pub in_cart_only: bool,
}

/// One resolved ingredient line of a recipe read model.
#[derive(Debug, Clone)]
pub struct IngredientLine {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub amount: i32,
}

/// Recipe read model: the aggregate resolved against the catalogs, with the
/// viewer's relation flags.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: recipe::Model,
    pub author: user::Model,
    /// Whether the viewer follows the author. `false` for anonymous viewers.
    pub is_subscribed: bool,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<IngredientLine>,
    /// `false` for anonymous viewers.
    pub is_favorited: bool,
    /// `false` for anonymous viewers.
    pub is_in_shopping_cart: bool,
}

/// Recipe service for business logic.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
    tag_repo: TagRepository,
    user_repo: UserRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: ShoppingCartRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
        tag_repo: TagRepository,
        user_repo: UserRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: ShoppingCartRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            recipe_repo,
            ingredient_repo,
            tag_repo,
            user_repo,
            favorite_repo,
            cart_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new recipe.
    pub async fn create(&self, author_id: &str, input: RecipeInput) -> AppResult<recipe::Model> {
        let (ingredients, tag_ids) = self.resolve_input(&input).await?;

        let recipe_id = self.id_gen.generate();
        let model = recipe::ActiveModel {
            id: Set(recipe_id.clone()),
            author_id: Set(author_id.to_string()),
            name: Set(input.name),
            text: Set(input.text),
            cooking_time: Set(input.cooking_time),
            image: Set(input.image),
            created_at: Set(chrono::Utc::now().into()),
        };

        let lines = self.build_lines(&recipe_id, &ingredients);
        let links = self.build_links(&recipe_id, &tag_ids);

        let created = self
            .recipe_repo
            .create_with_relations(model, lines, links)
            .await?;

        tracing::debug!(recipe_id = %created.id, author_id = %author_id, "Recipe created");
        Ok(created)
    }

    /// Replace a recipe's scalar fields and both composed collections.
    ///
    /// Only the author may update; the publication timestamp and author
    /// never change.
    pub async fn update(
        &self,
        recipe_id: &str,
        requester_id: &str,
        input: RecipeInput,
    ) -> AppResult<recipe::Model> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        if existing.author_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the author may update a recipe".to_string(),
            ));
        }

        let (ingredients, tag_ids) = self.resolve_input(&input).await?;

        let model = recipe::ActiveModel {
            id: Set(recipe_id.to_string()),
            name: Set(input.name),
            text: Set(input.text),
            cooking_time: Set(input.cooking_time),
            image: Set(input.image),
            ..Default::default()
        };

        let lines = self.build_lines(recipe_id, &ingredients);
        let links = self.build_links(recipe_id, &tag_ids);

        self.recipe_repo
            .update_with_relations(recipe_id, model, lines, links)
            .await
    }

    /// Delete a recipe and everything referencing it.
    pub async fn delete(&self, recipe_id: &str, requester_id: &str) -> AppResult<()> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        if existing.author_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the author may delete a recipe".to_string(),
            ));
        }

        self.recipe_repo.delete(recipe_id).await?;
        tracing::debug!(recipe_id = %recipe_id, "Recipe deleted");
        Ok(())
    }

    /// Get a recipe by id.
    pub async fn get(&self, recipe_id: &str) -> AppResult<recipe::Model> {
        self.recipe_repo.get_by_id(recipe_id).await
    }

    /// List recipes matching the filters, newest-published first.
    ///
    /// The `favorited_only` / `in_cart_only` flags only apply for an
    /// authenticated viewer; an anonymous viewer gets the unfiltered list.
    pub async fn list(
        &self,
        filters: &RecipeFilters,
        viewer: Option<&str>,
    ) -> AppResult<Vec<recipe::Model>> {
        let mut query = RecipeListQuery {
            author_id: filters.author.clone(),
            ..Default::default()
        };

        if let Some(ref slugs) = filters.tag_slugs {
            let tags = self.tag_repo.find_by_slugs(slugs).await?;
            query.tag_ids = Some(tags.into_iter().map(|t| t.id).collect());
        }

        if let Some(viewer) = viewer {
            let mut restrict: Option<Vec<String>> = None;
            if filters.favorited_only {
                restrict = Some(self.favorite_repo.targets_of(viewer).await?);
            }
            if filters.in_cart_only {
                let cart = self.cart_repo.targets_of(viewer).await?;
                restrict = Some(match restrict {
                    Some(favorited) => {
                        let cart: HashSet<String> = cart.into_iter().collect();
                        favorited.into_iter().filter(|id| cart.contains(id)).collect()
                    }
                    None => cart,
                });
            }
            query.restrict_to = restrict;
        }

        self.recipe_repo.list(&query).await
    }

    /// Assemble the read model for one recipe.
    pub async fn detail(&self, recipe_id: &str, viewer: Option<&str>) -> AppResult<RecipeDetail> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        let mut details = self.details(vec![recipe], viewer).await?;
        details
            .pop()
            .ok_or_else(|| AppError::Internal("Recipe detail assembly produced no rows".to_string()))
    }

    /// Assemble read models for a recipe set with batched lookups.
    pub async fn details(
        &self,
        recipes: Vec<recipe::Model>,
        viewer: Option<&str>,
    ) -> AppResult<Vec<RecipeDetail>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<String> = recipes.iter().map(|r| r.id.clone()).collect();
        let mut author_ids: Vec<String> = recipes.iter().map(|r| r.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut lines_by_recipe: HashMap<String, Vec<IngredientLine>> = HashMap::new();
        for (line, ingredient) in self.recipe_repo.find_lines_for_recipes(&recipe_ids).await? {
            let Some(ingredient) = ingredient else {
                tracing::warn!(line_id = %line.id, "Ingredient line without catalog entry");
                continue;
            };
            lines_by_recipe
                .entry(line.recipe_id)
                .or_default()
                .push(IngredientLine {
                    id: ingredient.id,
                    name: ingredient.name,
                    unit: ingredient.unit,
                    amount: line.amount,
                });
        }

        let mut tags_by_recipe: HashMap<String, Vec<tag::Model>> = HashMap::new();
        for (link, tag) in self.recipe_repo.find_links_for_recipes(&recipe_ids).await? {
            let Some(tag) = tag else {
                tracing::warn!(link_id = %link.id, "Tag link without catalog entry");
                continue;
            };
            tags_by_recipe.entry(link.recipe_id).or_default().push(tag);
        }

        // Anonymous viewers get all relation flags as false without any
        // storage lookups; storage failures for authenticated viewers
        // propagate instead of degrading to false.
        let (favorited, in_cart, followed) = match viewer {
            Some(viewer) => (
                to_set(self.favorite_repo.targets_of(viewer).await?),
                to_set(self.cart_repo.targets_of(viewer).await?),
                to_set(self.follow_repo.targets_of(viewer).await?),
            ),
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!("Recipe author missing: {}", recipe.author_id))
                })?;
                Ok(RecipeDetail {
                    is_subscribed: followed.contains(&author.id),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                    ingredients: lines_by_recipe.remove(&recipe.id).unwrap_or_default(),
                    author,
                    recipe,
                })
            })
            .collect()
    }

    /// Validate the input and resolve its catalog references.
    ///
    /// Runs entirely before any write: a bad amount, an unknown id or a
    /// duplicated ingredient rejects the whole payload.
    async fn resolve_input(
        &self,
        input: &RecipeInput,
    ) -> AppResult<(Vec<(String, i32)>, Vec<String>)> {
        input.validate()?;

        let mut seen = HashSet::new();
        for line in &input.ingredients {
            if !seen.insert(line.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate ingredient in payload: {}",
                    line.id
                )));
            }
        }

        let ingredient_ids: Vec<String> = input.ingredients.iter().map(|l| l.id.clone()).collect();
        let found: HashSet<String> = self
            .ingredient_repo
            .find_by_ids(&ingredient_ids)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();
        for id in &ingredient_ids {
            if !found.contains(id) {
                return Err(AppError::Validation(format!("Unknown ingredient: {id}")));
            }
        }

        // Tag links are a set; duplicates in the payload collapse.
        let mut tag_ids: Vec<String> = Vec::new();
        for id in &input.tags {
            if !tag_ids.contains(id) {
                tag_ids.push(id.clone());
            }
        }
        let found: HashSet<String> = self
            .tag_repo
            .find_by_ids(&tag_ids)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        for id in &tag_ids {
            if !found.contains(id) {
                return Err(AppError::Validation(format!("Unknown tag: {id}")));
            }
        }

        let ingredients = input
            .ingredients
            .iter()
            .map(|l| (l.id.clone(), l.amount))
            .collect();
        Ok((ingredients, tag_ids))
    }

    fn build_lines(
        &self,
        recipe_id: &str,
        ingredients: &[(String, i32)],
    ) -> Vec<recipe_ingredient::ActiveModel> {
        ingredients
            .iter()
            .map(|(ingredient_id, amount)| recipe_ingredient::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                ingredient_id: Set(ingredient_id.clone()),
                amount: Set(*amount),
            })
            .collect()
    }

    fn build_links(&self, recipe_id: &str, tag_ids: &[String]) -> Vec<recipe_tag::ActiveModel> {
        tag_ids
            .iter()
            .map(|tag_id| recipe_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                tag_id: Set(tag_id.clone()),
            })
            .collect()
    }
}

fn to_set(ids: Vec<String>) -> HashSet<String> {
    ids.into_iter().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_db::entities::ingredient;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        recipe_db: Arc<DatabaseConnection>,
        ingredient_db: Arc<DatabaseConnection>,
    ) -> RecipeService {
        RecipeService::new(
            RecipeRepository::new(recipe_db),
            IngredientRepository::new(ingredient_db),
            TagRepository::new(empty_db()),
            UserRepository::new(empty_db()),
            FavoriteRepository::new(empty_db()),
            ShoppingCartRepository::new(empty_db()),
            FollowRepository::new(empty_db()),
        )
    }

    fn valid_input() -> RecipeInput {
        RecipeInput {
            name: "Pancakes".to_string(),
            text: "Whisk and fry".to_string(),
            cooking_time: 20,
            image: "recipes/images/pancakes.png".to_string(),
            ingredients: vec![IngredientAmountInput {
                id: "i1".to_string(),
                amount: 200,
            }],
            tags: vec![],
        }
    }

    fn test_recipe(id: &str, author_id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            name: "Pancakes".to_string(),
            text: "Whisk and fry".to_string(),
            cooking_time: 20,
            image: "recipes/images/pancakes.png".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_cooking_time() {
        let service = service(empty_db(), empty_db());
        let mut input = valid_input();
        input.cooking_time = 0;

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_amount() {
        let service = service(empty_db(), empty_db());
        let mut input = valid_input();
        input.ingredients[0].amount = 0;

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_ingredient_list() {
        let service = service(empty_db(), empty_db());
        let mut input = valid_input();
        input.ingredients.clear();

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_ingredient() {
        let service = service(empty_db(), empty_db());
        let mut input = valid_input();
        input.ingredients.push(IngredientAmountInput {
            id: "i1".to_string(),
            amount: 50,
        });

        let result = service.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_ingredient() {
        // The catalog lookup resolves nothing.
        let ingredient_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ingredient::Model>::new()])
                .into_connection(),
        );
        let service = service(empty_db(), ingredient_db);

        let result = service.create("u1", valid_input()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_recipe("r1", "owner")]])
                .into_connection(),
        );
        let service = service(recipe_db, empty_db());

        let result = service.update("r1", "intruder", valid_input()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_recipe("r1", "owner")]])
                .into_connection(),
        );
        let service = service(recipe_db, empty_db());

        let result = service.delete("r1", "intruder").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_recipe_is_not_found() {
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );
        let service = service(recipe_db, empty_db());

        let result = service.delete("r1", "owner").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_ignores_viewer_flags_for_anonymous() {
        // Only the recipe query runs; the favorite/cart repositories are
        // never consulted for an anonymous viewer.
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_recipe("r1", "owner")]])
                .into_connection(),
        );
        let service = service(recipe_db, empty_db());

        let filters = RecipeFilters {
            favorited_only: true,
            in_cart_only: true,
            ..Default::default()
        };
        let recipes = service.list(&filters, None).await.unwrap();

        assert_eq!(recipes.len(), 1);
    }
}
