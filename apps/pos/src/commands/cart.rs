//! # Cart Commands
//!
//! Commands for ringing up a basket. None of these touch the dataset or
//! persist anything; the cart lives only for the session.

use serde::Serialize;
use tracing::debug;

use pakwan_core::{Cart, CartLine, CartTotals, Money};

use crate::error::ApiError;
use crate::state::{CartState, DatasetState};

/// Cart response with lines and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds one unit of a catalog product.
///
/// ## Behavior
/// - Product already in cart: quantity increases by one
/// - Otherwise: new line with price, category and color copied from the
///   catalog as they are right now
pub fn add_to_cart(
    dataset: &DatasetState,
    cart: &CartState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_cart command");

    let (product, category) = dataset.with_dataset(|d| {
        let product = d
            .product(product_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Product", product_id))?;
        let category = d.category(&product.category).cloned();
        Ok::<_, ApiError>((product, category))
    })?;

    cart.with_cart_mut(|c| {
        c.add(&product, category.as_ref())?;
        Ok(CartResponse::from(&*c))
    })
}

/// Adds a hand-priced line for a category, e.g. 0.5 kg of mithai.
pub fn add_custom_line(
    dataset: &DatasetState,
    cart: &CartState,
    category_id: &str,
    price: Money,
) -> Result<CartResponse, ApiError> {
    debug!(category_id = %category_id, price = %price, "add_custom_line command");

    let category = dataset
        .with_dataset(|d| d.category(category_id).cloned())
        .ok_or_else(|| ApiError::not_found("Category", category_id))?;

    cart.with_cart_mut(|c| {
        c.add_custom_line(&category, price)?;
        Ok(CartResponse::from(&*c))
    })
}

/// Changes a line's quantity by `delta`; zero or below removes it.
pub fn adjust_quantity(cart: &CartState, index: usize, delta: i64) -> Result<CartResponse, ApiError> {
    debug!(index, delta, "adjust_quantity command");
    cart.with_cart_mut(|c| {
        c.adjust_quantity(index, delta)?;
        Ok(CartResponse::from(&*c))
    })
}

pub fn remove_line(cart: &CartState, index: usize) -> Result<CartResponse, ApiError> {
    debug!(index, "remove_line command");
    cart.with_cart_mut(|c| {
        c.remove_line(index)?;
        Ok(CartResponse::from(&*c))
    })
}

pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing;

    #[tokio::test]
    async fn test_repeated_adds_make_one_line() {
        let (app, _) = testing::app().await;

        for _ in 0..4 {
            add_to_cart(&app.dataset, &app.cart, "chicken_biryani").unwrap();
        }
        let response = get_cart(&app.cart);
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].quantity, 4);
        assert_eq!(response.totals.total, Money::from_units(1280));
    }

    #[tokio::test]
    async fn test_price_is_snapshotted() {
        let (app, _) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "chicken_biryani").unwrap();

        app.dataset.with_dataset_mut(|d| {
            d.products.iter_mut().for_each(|p| p.price = Money::from_units(999));
        });
        let response = add_to_cart(&app.dataset, &app.cart, "chicken_biryani").unwrap();
        assert_eq!(response.lines[0].price, Money::from_units(320));
    }

    #[tokio::test]
    async fn test_adjust_to_zero_removes_line() {
        let (app, _) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "plain_naan").unwrap();
        add_to_cart(&app.dataset, &app.cart, "soft_drink").unwrap();

        let response = adjust_quantity(&app.cart, 0, -1).unwrap();
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].product_id, "soft_drink");

        let err = remove_line(&app.cart, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_oversized_adjust_is_rejected_and_cart_stays_usable() {
        let (app, _) = testing::app().await;
        add_to_cart(&app.dataset, &app.cart, "plain_naan").unwrap();

        let err = adjust_quantity(&app.cart, 0, i64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let response = get_cart(&app.cart);
        assert_eq!(response.lines[0].quantity, 1);
        assert_eq!(response.totals.total, Money::from_units(30));
    }

    #[tokio::test]
    async fn test_custom_line_for_weighed_category() {
        let (app, _) = testing::app().await;

        let response = add_custom_line(&app.dataset, &app.cart, "mithai", Money::from_units(600)).unwrap();
        assert_eq!(response.lines.len(), 1);
        assert!(response.lines[0].is_custom());
        assert!(response.lines[0].name.contains("0.500 kg"));

        let err = add_custom_line(&app.dataset, &app.cart, "mithai", Money::zero()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (app, _) = testing::app().await;
        let err = add_to_cart(&app.dataset, &app.cart, "sushi").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(clear_cart(&app.cart).lines.is_empty());
    }
}
