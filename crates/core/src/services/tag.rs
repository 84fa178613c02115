//! Tag catalog service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::tag, repositories::TagRepository};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;

#[allow(clippy::unwrap_used)]
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());
#[allow(clippy::unwrap_used)]
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// One tag of a seed fixture.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TagSeed {
    pub name: String,
    /// Hex color, `#RGB` or `#RRGGBB`.
    pub color: String,
    pub slug: String,
}

/// Tag catalog service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self {
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the catalog, ordered by name.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_all().await
    }

    /// Get a tag by id.
    pub async fn get(&self, tag_id: &str) -> AppResult<tag::Model> {
        self.tag_repo
            .find_by_id(tag_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag not found: {tag_id}")))
    }

    /// Load a fixture into the catalog.
    ///
    /// Idempotent on the slug: re-running the same fixture creates nothing.
    /// Returns the number of rows created.
    pub async fn seed(&self, seeds: Vec<TagSeed>) -> AppResult<usize> {
        let mut created = 0;
        for seed in seeds {
            if seed.name.is_empty() {
                return Err(AppError::Validation(
                    "Tag seed rows need a name".to_string(),
                ));
            }
            if !SLUG_RE.is_match(&seed.slug) {
                return Err(AppError::Validation(format!(
                    "Invalid tag slug: {}",
                    seed.slug
                )));
            }
            if !COLOR_RE.is_match(&seed.color) {
                return Err(AppError::Validation(format!(
                    "Invalid tag color: {}",
                    seed.color
                )));
            }

            if self.tag_repo.find_by_slug(&seed.slug).await?.is_some() {
                continue;
            }
            self.tag_repo
                .create(tag::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    name: Set(seed.name),
                    color: Set(seed.color),
                    slug: Set(seed.slug),
                })
                .await?;
            created += 1;
        }

        tracing::info!(created = created, "Tag fixture loaded");
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn seed(slug: &str, color: &str) -> TagSeed {
        TagSeed {
            name: "Breakfast".to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_rejects_bad_slug() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = TagService::new(TagRepository::new(db));

        let result = service.seed(vec![seed("break fast", "#49B64E")]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_rejects_bad_color() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = TagService::new(TagRepository::new(db));

        let result = service.seed(vec![seed("breakfast", "green")]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_skips_existing_slug() {
        let existing = tag::Model {
            id: "t1".to_string(),
            name: "Breakfast".to_string(),
            color: "#49B64E".to_string(),
            slug: "breakfast".to_string(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = TagService::new(TagRepository::new(db));

        let created = service.seed(vec![seed("breakfast", "#49B64E")]).await.unwrap();
        assert_eq!(created, 0);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );
        let service = TagService::new(TagRepository::new(db));

        let result = service.get("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
