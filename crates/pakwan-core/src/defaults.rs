//! # Default Data
//!
//! Two layers of fallback data for a terminal that has nothing else:
//!
//! 1. the bundled dataset document shipped inside the binary
//!    (`data/default_dataset.json`), and
//! 2. the built-in dataset constructed in code, used when even the bundled
//!    document cannot be decoded.
//!
//! The built-in catalog is also what replaces an empty catalog during
//! reconciliation.

use crate::money::Money;
use crate::types::{
    Category, Dataset, OrderType, PaymentMethod, Product, Settings, StoreInfo, Unit,
};

/// The dataset document bundled with the application.
pub const BUNDLED_DATASET_JSON: &str = include_str!("../data/default_dataset.json");

/// Decodes [`BUNDLED_DATASET_JSON`].
pub fn bundled_dataset() -> Result<Dataset, serde_json::Error> {
    serde_json::from_str(BUNDLED_DATASET_JSON)
}

fn category(id: &str, name: &str, color: &str, emoji: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        emoji: emoji.to_string(),
        unit: Unit::Pcs,
        base_price: Money::zero(),
    }
}

fn product(id: &str, name: &str, price: i64, category: &str, description: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price: Money::from_units(price),
        quantity: None,
        description: Some(description.to_string()),
        emoji: Some(String::new()),
    }
}

/// The minimal built-in menu.
pub fn builtin_catalog() -> (Vec<Category>, Vec<Product>) {
    let categories = vec![
        category("biryanis", "Biryanis", "#DC2626", "🍛"),
        category("karahi", "Karahi & Handi", "#EA580C", "🍲"),
        category("bbq", "BBQ & Grilled", "#D97706", "🍖"),
        category("breads", "Breads & Naan", "#92400E", "🍞"),
        category("rice", "Rice & Pulao", "#059669", "🍚"),
        category("drinks", "Beverages", "#2563EB", "🥤"),
    ];
    let products = vec![
        product("chicken_biryani", "Chicken Biryani", 320, "biryanis",
            "Aromatic basmati rice with tender chicken and traditional spices"),
        product("beef_biryani", "Beef Biryani", 380, "biryanis",
            "Rich beef biryani with slow-cooked meat and fragrant rice"),
        product("mutton_biryani", "Mutton Biryani", 420, "biryanis",
            "Traditional mutton biryani with tender goat meat"),
        product("chicken_karahi", "Chicken Karahi", 450, "karahi",
            "Spicy chicken karahi cooked in traditional wok with tomatoes"),
        product("mutton_karahi", "Mutton Karahi", 550, "karahi",
            "Tender mutton pieces in rich tomato-based curry"),
        product("chicken_handi", "Chicken Handi", 480, "karahi",
            "Creamy chicken curry cooked in clay pot"),
    ];
    (categories, products)
}

pub fn builtin_payment_methods() -> Vec<PaymentMethod> {
    [("cash", "Cash", "💵"), ("card", "Card", "💳"), ("easypaisa", "EasyPaisa", "📱"), ("jazzcash", "JazzCash", "📱")]
        .into_iter()
        .map(|(id, name, emoji)| PaymentMethod {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
        })
        .collect()
}

pub fn builtin_order_types() -> Vec<OrderType> {
    [("dinein", "Dine-in", "🍽️"), ("takeaway", "Takeaway", "🥡"), ("delivery", "Delivery", "🚚")]
        .into_iter()
        .map(|(id, name, emoji)| OrderType {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
        })
        .collect()
}

pub fn builtin_store() -> StoreInfo {
    StoreInfo {
        name: "Naseeb Biryani and Pakwan Center".to_string(),
        address: "Main Street, Karachi, Pakistan".to_string(),
        phone: "+92 300 1234567".to_string(),
        email: Some("info@naseebbiryani.com".to_string()),
        logo: Some("resources/LOGO.jpg".to_string()),
        receipt_header: Some("Thank you for dining with us!".to_string()),
        receipt_footer: Some("Follow us @naseebbiryani".to_string()),
        extra: serde_json::Map::new(),
    }
}

/// A fresh terminal: built-in menu, no orders, counter at 1.
pub fn builtin_dataset() -> Dataset {
    let (categories, products) = builtin_catalog();
    Dataset {
        store: builtin_store(),
        categories,
        products,
        orders: Default::default(),
        payment_methods: builtin_payment_methods(),
        order_types: builtin_order_types(),
        settings: Settings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_dataset_decodes() {
        let dataset = bundled_dataset().unwrap();
        assert!(!dataset.catalog_is_empty());
        assert!(dataset.orders.is_empty());
        assert_eq!(dataset.settings.next_order_number, 1);
        assert!(dataset.payment_method("jazzcash").is_some());
        assert_eq!(dataset.store.extra["taxRate"], 0);

        let mithai = dataset.category("mithai").unwrap();
        assert!(mithai.unit.is_measured());
        for product in &dataset.products {
            assert!(dataset.category(&product.category).is_some(), "{}", product.id);
        }
    }

    #[test]
    fn test_builtin_dataset_is_consistent() {
        let dataset = builtin_dataset();
        assert_eq!(dataset.categories.len(), 6);
        assert_eq!(dataset.products.len(), 6);
        assert_eq!(dataset.order_types.len(), 3);
        assert_eq!(
            dataset.product("mutton_karahi").unwrap().price,
            Money::from_units(550)
        );
        for product in &dataset.products {
            assert!(dataset.category(&product.category).is_some());
        }
    }
}
