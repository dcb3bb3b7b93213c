//! # Catalog Commands
//!
//! Category and product CRUD. Each successful change is persisted; a
//! rejected one leaves the catalog exactly as it was.

use serde::Serialize;
use tracing::{debug, info};

use pakwan_core::{Category, CategoryDraft, Dataset, PaymentMethod, OrderType, Product, ProductDraft};

use crate::error::ApiError;
use crate::state::{DatasetState, SyncState};

/// Everything a sales screen needs to draw the menu.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub payment_methods: Vec<PaymentMethod>,
    pub order_types: Vec<OrderType>,
}

pub fn get_catalog(dataset: &DatasetState) -> CatalogResponse {
    debug!("get_catalog command");
    dataset.with_dataset(|d| CatalogResponse {
        categories: d.categories.clone(),
        products: d.products.clone(),
        payment_methods: d.payment_methods.clone(),
        order_types: d.order_types.clone(),
    })
}

/// Runs a catalog mutation under the lock and persists on success.
async fn mutate<T>(
    dataset: &DatasetState,
    sync: &SyncState,
    f: impl FnOnce(&mut Dataset) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let value = dataset.with_dataset_mut(f)?;
    sync.persist(dataset).await;
    Ok(value)
}

/// Creates a category.
///
/// ## Rules
/// - Name is required and unique (case-insensitive)
/// - Measured units (kg, gram, ml, liter) need a positive base price
pub async fn add_category(
    dataset: &DatasetState,
    sync: &SyncState,
    draft: CategoryDraft,
) -> Result<Category, ApiError> {
    debug!(name = %draft.name, "add_category command");
    let category = mutate(dataset, sync, |d| {
        let id = d.add_category(draft)?;
        d.category(&id)
            .cloned()
            .ok_or_else(|| ApiError::internal("category vanished after insert"))
    })
    .await?;
    info!(category_id = %category.id, "Category added");
    Ok(category)
}

pub async fn edit_category(
    dataset: &DatasetState,
    sync: &SyncState,
    id: &str,
    draft: CategoryDraft,
) -> Result<Category, ApiError> {
    debug!(category_id = %id, "edit_category command");
    mutate(dataset, sync, |d| {
        d.edit_category(id, draft)?;
        d.category(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Category", id))
    })
    .await
}

/// Deletes a category no product refers to.
pub async fn delete_category(
    dataset: &DatasetState,
    sync: &SyncState,
    id: &str,
) -> Result<Category, ApiError> {
    debug!(category_id = %id, "delete_category command");
    let removed = mutate(dataset, sync, |d| Ok(d.delete_category(id)?)).await?;
    info!(category_id = %id, "Category deleted");
    Ok(removed)
}

/// Creates a product. Measured categories derive the price from
/// `basePrice × quantity`.
pub async fn add_product(
    dataset: &DatasetState,
    sync: &SyncState,
    draft: ProductDraft,
) -> Result<Product, ApiError> {
    debug!(name = %draft.name, category = %draft.category, "add_product command");
    let product = mutate(dataset, sync, |d| {
        let id = d.add_product(draft)?;
        d.product(&id)
            .cloned()
            .ok_or_else(|| ApiError::internal("product vanished after insert"))
    })
    .await?;
    info!(product_id = %product.id, price = %product.price, "Product added");
    Ok(product)
}

pub async fn update_product(
    dataset: &DatasetState,
    sync: &SyncState,
    id: &str,
    draft: ProductDraft,
) -> Result<Product, ApiError> {
    debug!(product_id = %id, "update_product command");
    mutate(dataset, sync, |d| {
        d.update_product(id, draft)?;
        d.product(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Product", id))
    })
    .await
}

pub async fn delete_product(
    dataset: &DatasetState,
    sync: &SyncState,
    id: &str,
) -> Result<Product, ApiError> {
    debug!(product_id = %id, "delete_product command");
    mutate(dataset, sync, |d| Ok(d.delete_product(id)?)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing;
    use pakwan_core::{Money, Unit};

    fn category_draft(name: &str, unit: Unit, base_price: i64) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            color: "#7C3AED".to_string(),
            emoji: None,
            unit,
            base_price: Money::from_units(base_price),
        }
    }

    fn product_draft(name: &str, category: &str, price: Option<i64>, quantity: Option<f64>) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: category.to_string(),
            price: price.map(Money::from_units),
            quantity,
            description: None,
            emoji: None,
        }
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let (app, _) = testing::app().await;
        let before = get_catalog(&app.dataset).categories.len();

        let err = delete_category(&app.dataset, &app.sync, "biryanis").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(get_catalog(&app.dataset).categories.len(), before);

        let added = add_category(&app.dataset, &app.sync, category_draft("Desserts", Unit::Pcs, 0))
            .await
            .unwrap();
        assert_eq!(added.id, "desserts");
        assert_eq!(added.emoji, "📦");

        delete_category(&app.dataset, &app.sync, "desserts").await.unwrap();
        assert_eq!(get_catalog(&app.dataset).categories.len(), before);
    }

    #[tokio::test]
    async fn test_duplicate_category_name_is_rejected() {
        let (app, _) = testing::app().await;
        add_category(&app.dataset, &app.sync, category_draft("Soups", Unit::Pcs, 0))
            .await
            .unwrap();

        let err = add_category(&app.dataset, &app.sync, category_draft("  soups ", Unit::Pcs, 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_measured_product_price_is_derived() {
        let (app, _) = testing::app().await;
        add_category(&app.dataset, &app.sync, category_draft("Sweets", Unit::Kg, 1600))
            .await
            .unwrap();

        let product = add_product(
            &app.dataset,
            &app.sync,
            product_draft("Barfi Half Kilo", "sweets", None, Some(0.5)),
        )
        .await
        .unwrap();
        assert_eq!(product.price, Money::from_units(800));
        assert_eq!(product.id, "barfihalfkilo");

        let updated = update_product(
            &app.dataset,
            &app.sync,
            &product.id,
            product_draft("Barfi Half Kilo", "sweets", None, Some(0.75)),
        )
        .await
        .unwrap();
        assert_eq!(updated.price, Money::from_units(1200));

        let err = add_product(&app.dataset, &app.sync, product_draft("Nothing", "sweets", None, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let (app, _) = testing::app().await;
        let removed = delete_product(&app.dataset, &app.sync, "plain_naan").await.unwrap();
        assert_eq!(removed.id, "plain_naan");

        let err = delete_product(&app.dataset, &app.sync, "plain_naan").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
