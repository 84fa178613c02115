//! User service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::user,
    repositories::{FollowRepository, UserRepository},
};

/// A user together with the viewer's follow flag.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: user::Model,
    /// Whether the viewer follows this user. `false` for anonymous viewers
    /// and for the viewer's own profile.
    pub is_subscribed: bool,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    follow_repo: FollowRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, follow_repo: FollowRepository) -> Self {
        Self {
            user_repo,
            follow_repo,
        }
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Resolve an API token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user's profile as seen by the viewer.
    pub async fn profile(&self, user_id: &str, viewer: Option<&str>) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let is_subscribed = match viewer {
            Some(viewer) if viewer != user_id => self.follow_repo.exists(viewer, user_id).await?,
            _ => false,
        };
        Ok(UserProfile {
            user,
            is_subscribed,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "chef".to_string(),
            email: "chef@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "Chef".to_string(),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = UserService::new(
            UserRepository::new(user_db),
            FollowRepository::new(empty_db()),
        );

        let result = service.authenticate("bad-token").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_own_profile_is_never_subscribed() {
        // Only the user lookup runs; the follow edge is not consulted for
        // the viewer's own profile.
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1")]])
                .into_connection(),
        );
        let service = UserService::new(
            UserRepository::new(user_db),
            FollowRepository::new(empty_db()),
        );

        let profile = service.profile("u1", Some("u1")).await.unwrap();
        assert!(!profile.is_subscribed);
    }

    #[tokio::test]
    async fn test_anonymous_profile_is_never_subscribed() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1")]])
                .into_connection(),
        );
        let service = UserService::new(
            UserRepository::new(user_db),
            FollowRepository::new(empty_db()),
        );

        let profile = service.profile("u1", None).await.unwrap();
        assert!(!profile.is_subscribed);
    }
}
