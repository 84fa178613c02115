//! Follow service.
//!
//! Follows are toggle edges between users. A subscription read model pairs
//! the followed author with a preview of their recipes.

use std::collections::HashMap;

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::{recipe, user},
    repositories::{FollowRepository, RecipeRepository, UserRepository},
};

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub author: user::Model,
    /// Author's recipes, newest first, truncated to the requested limit.
    pub recipes: Vec<recipe::Model>,
    /// Total recipe count, unaffected by the preview limit.
    pub recipes_count: u64,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            recipe_repo,
        }
    }

    /// Follow an author.
    ///
    /// Self-follows are rejected before any write; a duplicate follow is
    /// `Conflict`.
    pub async fn subscribe(
        &self,
        user_id: &str,
        author_id: &str,
        recipes_limit: Option<usize>,
    ) -> AppResult<Subscription> {
        if user_id == author_id {
            return Err(AppError::Validation(
                "Cannot subscribe to yourself".to_string(),
            ));
        }

        let author = self.user_repo.get_by_id(author_id).await?;
        self.follow_repo.add(user_id, author_id).await?;

        tracing::debug!(user_id = %user_id, author_id = %author_id, "Subscribed");
        self.subscription_for(author, recipes_limit).await
    }

    /// Unfollow an author; `NotFound` when not following.
    pub async fn unsubscribe(&self, user_id: &str, author_id: &str) -> AppResult<()> {
        self.follow_repo.remove(user_id, author_id).await
    }

    /// Whether the viewer follows the author. Anonymous viewers never do.
    pub async fn is_subscribed(&self, viewer: Option<&str>, author_id: &str) -> AppResult<bool> {
        match viewer {
            Some(user_id) => self.follow_repo.exists(user_id, author_id).await,
            None => Ok(false),
        }
    }

    /// All authors the user follows, newest follow first.
    pub async fn subscriptions(
        &self,
        user_id: &str,
        recipes_limit: Option<usize>,
    ) -> AppResult<Vec<Subscription>> {
        let author_ids = self.follow_repo.targets_of(user_id).await?;
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut subscriptions = Vec::with_capacity(author_ids.len());
        for author_id in &author_ids {
            let Some(author) = authors.remove(author_id) else {
                tracing::warn!(author_id = %author_id, "Followed author no longer exists");
                continue;
            };
            subscriptions.push(self.subscription_for(author, recipes_limit).await?);
        }
        Ok(subscriptions)
    }

    async fn subscription_for(
        &self,
        author: user::Model,
        recipes_limit: Option<usize>,
    ) -> AppResult<Subscription> {
        let mut recipes = self.recipe_repo.find_by_author(&author.id).await?;
        let recipes_count = self.recipe_repo.count_by_author(&author.id).await?;
        if let Some(limit) = recipes_limit {
            recipes.truncate(limit);
        }
        Ok(Subscription {
            author,
            recipes,
            recipes_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(user_db: Arc<DatabaseConnection>) -> FollowService {
        FollowService::new(
            FollowRepository::new(empty_db()),
            UserRepository::new(user_db),
            RecipeRepository::new(empty_db()),
        )
    }

    #[tokio::test]
    async fn test_subscribe_to_self_is_rejected() {
        let service = service(empty_db());

        let result = service.subscribe("u1", "u1", None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribe_to_missing_author_is_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = service(user_db);

        let result = service.subscribe("u1", "missing", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_is_subscribed_is_false_for_anonymous() {
        let service = service(empty_db());

        assert!(!service.is_subscribed(None, "u2").await.unwrap());
    }
}
