//! Recipe repository.
//!
//! A recipe row owns two composed collections (ingredient lines and tag
//! links). Every mutation here commits the scalar row and the full
//! collections in one transaction, so a concurrent reader never observes a
//! partially-replaced recipe.

use std::sync::Arc;

use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use crate::entities::{
    ingredient, recipe, recipe_ingredient, recipe_tag, tag, Recipe, RecipeIngredient, RecipeTag,
};

/// Storage-level filter for recipe listings.
///
/// The caller resolves tag slugs and viewer-relation predicates to id sets
/// before querying.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    /// Exact author match.
    pub author_id: Option<String>,
    /// Keep recipes linked to at least one of these tags.
    pub tag_ids: Option<Vec<String>>,
    /// Keep only recipes from this id set (favorite / cart restriction).
    pub restrict_to: Option<Vec<String>>,
}

/// An ingredient line joined with its catalog entry.
pub type JoinedLine = (recipe_ingredient::Model, Option<ingredient::Model>);

/// A tag link joined with its catalog entry.
pub type JoinedLink = (recipe_tag::Model, Option<tag::Model>);

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a recipe by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recipe not found: {id}")))
    }

    /// Insert a recipe together with its lines and links, atomically.
    pub async fn create_with_relations(
        &self,
        recipe: recipe::ActiveModel,
        lines: Vec<recipe_ingredient::ActiveModel>,
        links: Vec<recipe_tag::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = recipe
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !lines.is_empty() {
            RecipeIngredient::insert_many(lines)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if !links.is_empty() {
            RecipeTag::insert_many(links)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Update a recipe's scalar fields and fully replace its lines and
    /// links, atomically (delete-all-then-recreate).
    pub async fn update_with_relations(
        &self,
        recipe_id: &str,
        recipe: recipe::ActiveModel,
        lines: Vec<recipe_ingredient::ActiveModel>,
        links: Vec<recipe_tag::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = recipe
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeTag::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !lines.is_empty() {
            RecipeIngredient::insert_many(lines)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if !links.is_empty() {
            RecipeTag::insert_many(links)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Delete a recipe.
    ///
    /// Lines, links, favorites and cart entries referencing it go with it
    /// via `ON DELETE CASCADE`.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List recipes matching the query, newest-published first.
    pub async fn list(&self, query: &RecipeListQuery) -> AppResult<Vec<recipe::Model>> {
        let mut select = Recipe::find().order_by_desc(recipe::Column::CreatedAt);

        if let Some(ref author_id) = query.author_id {
            select = select.filter(recipe::Column::AuthorId.eq(author_id));
        }

        if let Some(ref tag_ids) = query.tag_ids {
            let tagged = self.recipe_ids_with_tags(tag_ids).await?;
            if tagged.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(recipe::Column::Id.is_in(tagged));
        }

        if let Some(ref ids) = query.restrict_to {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(recipe::Column::Id.is_in(ids.iter().cloned()));
        }

        select
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recipes by an author, newest-published first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<recipe::Model>> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        use sea_orm::PaginatorTrait;

        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient lines of one recipe, joined with the catalog.
    pub async fn find_lines(&self, recipe_id: &str) -> AppResult<Vec<JoinedLine>> {
        RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .find_also_related(crate::entities::Ingredient)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient lines across a recipe set, joined with the catalog.
    ///
    /// Input to the shopping-list aggregation.
    pub async fn find_lines_for_recipes(
        &self,
        recipe_ids: &[String],
    ) -> AppResult<Vec<JoinedLine>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.iter().cloned()))
            .find_also_related(crate::entities::Ingredient)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tag links across a recipe set, joined with the catalog.
    pub async fn find_links_for_recipes(
        &self,
        recipe_ids: &[String],
    ) -> AppResult<Vec<JoinedLink>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.iter().cloned()))
            .find_also_related(crate::entities::Tag)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recipe ids linked to at least one of the given tags (OR semantics).
    async fn recipe_ids_with_tags(&self, tag_ids: &[String]) -> AppResult<Vec<String>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = RecipeTag::find()
            .filter(recipe_tag::Column::TagId.is_in(tag_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut ids: Vec<String> = links.into_iter().map(|link| link.recipe_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn test_recipe(id: &str, author_id: &str, name: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            name: name.to_string(),
            text: "Mix and bake".to_string(),
            cooking_time: 30,
            image: "recipes/images/cake.png".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing_recipe() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.get_by_id("nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_without_filters() {
        let newer = test_recipe("r2", "u1", "Pie");
        let older = test_recipe("r1", "u1", "Cake");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[newer, older]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let recipes = repo.list(&RecipeListQuery::default()).await.unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, "r2");
    }

    #[tokio::test]
    async fn test_list_with_empty_restriction_short_circuits() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = RecipeRepository::new(db);
        let recipes = repo
            .list(&RecipeListQuery {
                restrict_to: Some(Vec::new()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(recipes.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_unmatched_tags_short_circuits() {
        // The tag-link lookup comes back empty, so no recipe query runs.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe_tag::Model>::new()])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let recipes = repo
            .list(&RecipeListQuery {
                tag_ids: Some(vec!["t1".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(recipes.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_lines_and_links_in_one_transaction() {
        let updated = test_recipe("r1", "u1", "Cheesecake");
        let inserted_line: BTreeMap<&str, sea_orm::Value> =
            [("id", "l1".into())].into_iter().collect();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated.clone()]])
                .append_query_results([vec![inserted_line]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = RecipeRepository::new(Arc::clone(&db));
        let model = repo
            .update_with_relations(
                "r1",
                recipe::ActiveModel {
                    id: Set("r1".to_string()),
                    name: Set("Cheesecake".to_string()),
                    text: Set("Mix and bake".to_string()),
                    cooking_time: Set(45),
                    image: Set("recipes/images/cheesecake.png".to_string()),
                    ..Default::default()
                },
                vec![recipe_ingredient::ActiveModel {
                    id: Set("l1".to_string()),
                    recipe_id: Set("r1".to_string()),
                    ingredient_id: Set("i1".to_string()),
                    amount: Set(200),
                }],
                Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(model, updated);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        // Everything ran inside a single begin..commit.
        assert_eq!(log.len(), 1);

        let log = format!("{log:?}");
        let update = log.find(r#"UPDATE "recipe""#).unwrap();
        let delete_lines = log.find(r#"DELETE FROM "recipe_ingredient""#).unwrap();
        let delete_links = log.find(r#"DELETE FROM "recipe_tag""#).unwrap();
        let insert_lines = log.find(r#"INSERT INTO "recipe_ingredient""#).unwrap();
        assert!(update < delete_lines);
        assert!(delete_lines < delete_links);
        assert!(delete_links < insert_lines);
    }

    #[tokio::test]
    async fn test_list_with_tags_matches_any_linked_tag() {
        // Two tags requested; r1 carries both, r2 only one. Both recipes
        // qualify, and r1 feeds the id restriction exactly once.
        let links = vec![
            recipe_tag::Model {
                id: "k1".to_string(),
                recipe_id: "r1".to_string(),
                tag_id: "t_breakfast".to_string(),
            },
            recipe_tag::Model {
                id: "k2".to_string(),
                recipe_id: "r2".to_string(),
                tag_id: "t_lunch".to_string(),
            },
            recipe_tag::Model {
                id: "k3".to_string(),
                recipe_id: "r1".to_string(),
                tag_id: "t_lunch".to_string(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([links])
                .append_query_results([[test_recipe("r2", "u1", "Soup"), test_recipe("r1", "u1", "Omelette")]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(Arc::clone(&db));
        let recipes = repo
            .list(&RecipeListQuery {
                tag_ids: Some(vec!["t_breakfast".to_string(), "t_lunch".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, "r2");
        assert_eq!(recipes[1].id, "r1");

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        let restriction = &log[log.find(r#"SELECT "recipe"."#).unwrap()..];
        assert!(restriction.contains(r#""recipe"."id" IN"#));
        // r1 matched two tags but appears in the restriction once.
        assert_eq!(restriction.matches("r1").count(), 1);
        assert_eq!(restriction.matches("r2").count(), 1);
    }

    #[tokio::test]
    async fn test_find_lines_for_recipes_empty_set() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = RecipeRepository::new(db);
        assert!(repo.find_lines_for_recipes(&[]).await.unwrap().is_empty());
    }
}
