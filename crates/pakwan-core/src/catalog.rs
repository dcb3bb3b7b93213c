//! # Catalog Store
//!
//! Category and product maintenance on a [`Dataset`].
//!
//! ## Rules
//! - Category names are unique, case-insensitively
//! - A category cannot be deleted while any product references it
//! - Measured categories (kg, litre, ...) price products as
//!   `round(base_price × quantity)`; piece categories take the price as given
//! - Ids are derived from names once and never change afterwards

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Category, CategoryId, Dataset, Product, ProductId, Unit};
use crate::validation::{validate_measure_quantity, validate_name, validate_positive_price};

/// Emoji used when a category is created without one.
pub const DEFAULT_CATEGORY_EMOJI: &str = "📦";

/// Longest product id generated from a name.
pub const PRODUCT_ID_MAX_LEN: usize = 20;

// =============================================================================
// Inputs
// =============================================================================

/// Fields for creating or editing a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub base_price: Money,
}

/// Fields for creating or editing a product.
///
/// `price` is used for piece categories, `quantity` for measured ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: CategoryId,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

// =============================================================================
// Id Generation
// =============================================================================

/// `"Karahi & Handi"` → `"karahi_&_handi"`: lower-case, whitespace runs to `_`.
pub fn category_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// `"Chicken Biryani (Full)"` → `"chickenbiryanifull"`: lower-case ASCII
/// letters and digits only, at most 20 characters.
pub fn product_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(PRODUCT_ID_MAX_LEN)
        .collect()
}

/// Appends `_2`, `_3`, ... until `taken` says the id is free.
fn unique_id(base: String, fallback: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = if base.is_empty() {
        fallback.to_string()
    } else {
        base
    };
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// =============================================================================
// Category Operations
// =============================================================================

impl Dataset {
    fn check_category_name(&self, name: &str, except: Option<&str>) -> CoreResult<String> {
        let name = validate_name("category", name)?;
        let lower = name.to_lowercase();
        let clash = self
            .categories
            .iter()
            .filter(|c| Some(c.id.as_str()) != except)
            .any(|c| c.name.to_lowercase() == lower);
        if clash {
            return Err(ValidationError::Duplicate {
                field: "category".to_string(),
                value: name,
            }
            .into());
        }
        Ok(name)
    }

    fn check_base_price(draft: &CategoryDraft) -> CoreResult<()> {
        if draft.unit.is_measured() {
            validate_positive_price(draft.base_price).map_err(|_| {
                ValidationError::MustBePositive {
                    field: "basePrice".to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// Creates a category and returns its id.
    pub fn add_category(&mut self, draft: CategoryDraft) -> CoreResult<CategoryId> {
        let name = self.check_category_name(&draft.name, None)?;
        Self::check_base_price(&draft)?;

        let id = unique_id(category_slug(&name), "category", |id| {
            self.category(id).is_some()
        });
        let emoji = draft
            .emoji
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY_EMOJI.to_string());

        self.categories.push(Category {
            id: id.clone(),
            name,
            color: draft.color,
            emoji,
            unit: draft.unit,
            base_price: draft.base_price,
        });
        Ok(id)
    }

    /// Updates name, color, emoji, unit and base price. The id is kept.
    pub fn edit_category(&mut self, id: &str, draft: CategoryDraft) -> CoreResult<()> {
        if self.category(id).is_none() {
            return Err(CoreError::CategoryNotFound(id.to_string()));
        }
        let name = self.check_category_name(&draft.name, Some(id))?;
        Self::check_base_price(&draft)?;

        if let Some(category) = self.categories.iter_mut().find(|c| c.id == id) {
            category.name = name;
            category.color = draft.color;
            if let Some(emoji) = draft.emoji.filter(|e| !e.trim().is_empty()) {
                category.emoji = emoji;
            }
            category.unit = draft.unit;
            category.base_price = draft.base_price;
        }
        Ok(())
    }

    /// Removes a category that no product uses.
    pub fn delete_category(&mut self, id: &str) -> CoreResult<Category> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::CategoryNotFound(id.to_string()))?;

        let count = self.products.iter().filter(|p| p.category == id).count();
        if count > 0 {
            return Err(CoreError::CategoryInUse {
                id: id.to_string(),
                count,
            });
        }
        Ok(self.categories.remove(index))
    }

    // =========================================================================
    // Product Operations
    // =========================================================================

    /// Resolves the selling price for a draft against its category.
    fn price_product(&self, draft: &ProductDraft) -> CoreResult<(Money, Option<f64>)> {
        let category = self
            .category(&draft.category)
            .ok_or_else(|| CoreError::CategoryNotFound(draft.category.clone()))?;

        if category.unit.is_measured() {
            let quantity = draft.quantity.ok_or_else(|| ValidationError::Required {
                field: "quantity".to_string(),
            })?;
            validate_measure_quantity(quantity)?;
            let price = category.base_price.scale(quantity);
            validate_positive_price(price)?;
            Ok((price, Some(quantity)))
        } else {
            let price = draft.price.ok_or_else(|| ValidationError::Required {
                field: "price".to_string(),
            })?;
            validate_positive_price(price)?;
            Ok((price, None))
        }
    }

    /// Creates a product and returns its id.
    pub fn add_product(&mut self, draft: ProductDraft) -> CoreResult<ProductId> {
        let name = validate_name("name", &draft.name)?;
        let (price, quantity) = self.price_product(&draft)?;

        let id = unique_id(product_slug(&name), "item", |id| self.product(id).is_some());
        self.products.push(Product {
            id: id.clone(),
            name,
            category: draft.category,
            price,
            quantity,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            emoji: draft.emoji,
        });
        Ok(id)
    }

    /// Replaces a product's fields, re-applying the pricing rule.
    pub fn update_product(&mut self, id: &str, draft: ProductDraft) -> CoreResult<()> {
        if self.product(id).is_none() {
            return Err(CoreError::ProductNotFound(id.to_string()));
        }
        let name = validate_name("name", &draft.name)?;
        let (price, quantity) = self.price_product(&draft)?;

        if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
            product.name = name;
            product.category = draft.category;
            product.price = price;
            product.quantity = quantity;
            product.description = draft.description.filter(|d| !d.trim().is_empty());
            product.emoji = draft.emoji;
        }
        Ok(())
    }

    /// Removes a product. Committed orders keep their item snapshots.
    pub fn delete_product(&mut self, id: &str) -> CoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        Ok(self.products.remove(index))
    }
}
