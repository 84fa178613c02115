//! Generic toggle-edge repository.
//!
//! A toggle edge is a uniqueness-constrained (user, target) pair: favorites,
//! shopping-cart entries and follows all share this shape. One generic
//! repository covers the add/remove/exists operations for all three; the
//! per-kind invariants live in the service layer.

use std::marker::PhantomData;
use std::sync::Arc;

use foodgram_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::entities::{favorite, follow, shopping_cart};

/// A uniqueness-constrained (user, target) edge entity.
pub trait ToggleEdge: EntityTrait {
    /// Human-readable edge name for error messages.
    const KIND: &'static str;

    /// Primary-key column (used for recency ordering).
    fn id_column() -> Self::Column;
    /// Column holding the user side of the edge.
    fn user_column() -> Self::Column;
    /// Column holding the target side of the edge.
    fn target_column() -> Self::Column;
    /// Build a new edge row.
    fn new_edge(id: String, user_id: &str, target_id: &str) -> Self::ActiveModel;
    /// Extract the target id from a stored edge.
    fn target_id(model: &Self::Model) -> String;
}

/// Repository over any [`ToggleEdge`] entity.
#[derive(Clone)]
pub struct ToggleRepository<E: ToggleEdge> {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
    _edge: PhantomData<E>,
}

impl<E> ToggleRepository<E>
where
    E: ToggleEdge,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    /// Create a new toggle repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
            _edge: PhantomData,
        }
    }

    /// Insert the (user, target) edge.
    ///
    /// Uniqueness is enforced by the database index, not by a prior
    /// existence check: of two concurrent inserts for the same pair the
    /// second committer fails with [`AppError::Conflict`].
    pub async fn add(&self, user_id: &str, target_id: &str) -> AppResult<E::Model> {
        let model = E::new_edge(self.id_gen.generate(), user_id, target_id);

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|err| map_insert_err(E::KIND, err.sql_err(), &err))
    }

    /// Delete the (user, target) edge.
    ///
    /// Reports [`AppError::NotFound`] when the edge was absent; removal is
    /// never a silent no-op.
    pub async fn remove(&self, user_id: &str, target_id: &str) -> AppResult<()> {
        let result = E::delete_many()
            .filter(E::user_column().eq(user_id))
            .filter(E::target_column().eq(target_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{} not found", E::KIND)));
        }
        Ok(())
    }

    /// Check whether the (user, target) edge exists.
    pub async fn exists(&self, user_id: &str, target_id: &str) -> AppResult<bool> {
        Ok(E::find()
            .filter(E::user_column().eq(user_id))
            .filter(E::target_column().eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .is_some())
    }

    /// Target ids of all edges for a user, newest edge first.
    pub async fn targets_of(&self, user_id: &str) -> AppResult<Vec<String>> {
        let edges = E::find()
            .filter(E::user_column().eq(user_id))
            .order_by_desc(E::id_column())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.iter().map(|edge| E::target_id(edge)).collect())
    }
}

/// Map an insert failure to the application error space.
///
/// A unique-index violation means the edge already exists and becomes
/// [`AppError::Conflict`]; anything else is a database fault.
fn map_insert_err(kind: &str, sql_err: Option<SqlErr>, err: &sea_orm::DbErr) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{kind} already exists"))
        }
        _ => AppError::Database(err.to_string()),
    }
}

impl ToggleEdge for favorite::Entity {
    const KIND: &'static str = "favorite";

    fn id_column() -> Self::Column {
        favorite::Column::Id
    }

    fn user_column() -> Self::Column {
        favorite::Column::UserId
    }

    fn target_column() -> Self::Column {
        favorite::Column::RecipeId
    }

    fn new_edge(id: String, user_id: &str, target_id: &str) -> Self::ActiveModel {
        favorite::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(target_id.to_string()),
        }
    }

    fn target_id(model: &Self::Model) -> String {
        model.recipe_id.clone()
    }
}

impl ToggleEdge for shopping_cart::Entity {
    const KIND: &'static str = "shopping cart entry";

    fn id_column() -> Self::Column {
        shopping_cart::Column::Id
    }

    fn user_column() -> Self::Column {
        shopping_cart::Column::UserId
    }

    fn target_column() -> Self::Column {
        shopping_cart::Column::RecipeId
    }

    fn new_edge(id: String, user_id: &str, target_id: &str) -> Self::ActiveModel {
        shopping_cart::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(target_id.to_string()),
        }
    }

    fn target_id(model: &Self::Model) -> String {
        model.recipe_id.clone()
    }
}

impl ToggleEdge for follow::Entity {
    const KIND: &'static str = "follow";

    fn id_column() -> Self::Column {
        follow::Column::Id
    }

    fn user_column() -> Self::Column {
        follow::Column::UserId
    }

    fn target_column() -> Self::Column {
        follow::Column::AuthorId
    }

    fn new_edge(id: String, user_id: &str, target_id: &str) -> Self::ActiveModel {
        follow::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            author_id: Set(target_id.to_string()),
        }
    }

    fn target_id(model: &Self::Model) -> String {
        model.author_id.clone()
    }
}

/// Favorite edges (user <-> recipe).
pub type FavoriteRepository = ToggleRepository<favorite::Entity>;
/// Shopping cart edges (user <-> recipe).
pub type ShoppingCartRepository = ToggleRepository<shopping_cart::Entity>;
/// Follow edges (user <-> author).
pub type FollowRepository = ToggleRepository<follow::Entity>;
