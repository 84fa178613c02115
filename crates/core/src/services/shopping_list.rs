//! Shopping-list aggregation.
//!
//! Collapses every ingredient line of the recipes in a user's cart into one
//! total per (name, unit) pair and renders the plain-text list.

use std::collections::HashMap;

use foodgram_common::AppResult;
use foodgram_db::repositories::{RecipeRepository, ShoppingCartRepository};

/// Shopping-list service for business logic.
#[derive(Clone)]
pub struct ShoppingListService {
    cart_repo: ShoppingCartRepository,
    recipe_repo: RecipeRepository,
}

impl ShoppingListService {
    /// Create a new shopping-list service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
        }
    }

    /// Render the user's aggregated shopping list.
    ///
    /// An empty cart renders to an empty document, not an error.
    pub async fn render(&self, user_id: &str) -> AppResult<String> {
        let recipe_ids = self.cart_repo.targets_of(user_id).await?;
        if recipe_ids.is_empty() {
            return Ok(String::new());
        }

        let mut entries = Vec::new();
        for (line, ingredient) in self.recipe_repo.find_lines_for_recipes(&recipe_ids).await? {
            let Some(ingredient) = ingredient else {
                tracing::warn!(line_id = %line.id, "Ingredient line without catalog entry");
                continue;
            };
            entries.push((ingredient.name, ingredient.unit, i64::from(line.amount)));
        }

        Ok(aggregate(entries))
    }
}

/// Sum amounts per (name, unit) key and render one line per key.
///
/// The same ingredient name under two different units stays two separate
/// lines. Output is ordered by total descending, then key ascending, so
/// the biggest quantities lead the list deterministically.
fn aggregate(entries: impl IntoIterator<Item = (String, String, i64)>) -> String {
    let mut totals: HashMap<(String, String), i64> = HashMap::new();
    for (name, unit, amount) in entries {
        *totals.entry((name, unit)).or_default() += amount;
    }

    let mut rows: Vec<((String, String), i64)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    rows.into_iter()
        .map(|((name, unit), total)| format!("{name} ({unit}) - {total}"))
        .collect::<Vec<_>>()
        .join("\n")
}
