//! Ingredient catalog service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};
use sea_orm::Set;

/// One ingredient of a seed fixture.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IngredientSeed {
    pub name: String,
    #[serde(rename = "measurement_unit")]
    pub unit: String,
}

/// Ingredient catalog service for business logic.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
    id_gen: IdGenerator,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository) -> Self {
        Self {
            ingredient_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the catalog, optionally narrowed by a case-insensitive name
    /// substring.
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        match search {
            Some(term) if !term.is_empty() => self.ingredient_repo.search_by_name(term).await,
            _ => self.ingredient_repo.find_all().await,
        }
    }

    /// Get an ingredient by id.
    pub async fn get(&self, ingredient_id: &str) -> AppResult<ingredient::Model> {
        self.ingredient_repo
            .find_by_id(ingredient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient not found: {ingredient_id}")))
    }

    /// Load a fixture into the catalog.
    ///
    /// Idempotent on the (name, unit) pair: re-running the same fixture
    /// creates nothing. Returns the number of rows created.
    pub async fn seed(&self, seeds: Vec<IngredientSeed>) -> AppResult<usize> {
        let mut created = 0;
        for seed in seeds {
            if seed.name.is_empty() || seed.unit.is_empty() {
                return Err(AppError::Validation(
                    "Ingredient seed rows need a name and a unit".to_string(),
                ));
            }
            if self
                .ingredient_repo
                .find_by_name_and_unit(&seed.name, &seed.unit)
                .await?
                .is_some()
            {
                continue;
            }
            self.ingredient_repo
                .create(ingredient::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    name: Set(seed.name),
                    unit: Set(seed.unit),
                })
                .await?;
            created += 1;
        }

        tracing::info!(created = created, "Ingredient fixture loaded");
        Ok(created)
    }
}
