//! Public product summaries.

use serde::{Deserialize, Serialize};

use crate::checkout::SelectedItem;
use crate::types::{Price, ProductId};

/// A product as listed by `/products/public`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    #[serde(default)]
    pub discount: u8,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub count_in_stock: u32,
    #[serde(default)]
    pub description: String,
}

impl Product {
    #[must_use]
    pub fn discounted_price(&self) -> Price {
        self.price.discounted(self.discount)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }

    /// The selection line for buying `amount` of this product.
    #[must_use]
    pub fn to_selected(&self, amount: u32) -> SelectedItem {
        SelectedItem {
            product: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            discount: self.discount,
            amount,
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_and_buy() {
        let json = serde_json::json!({
            "_id": "p1",
            "name": "Lotus tea",
            "slug": "lotus-tea",
            "price": 100000,
            "discount": 10,
            "countInStock": 3
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert!(product.in_stock());
        assert_eq!(product.discounted_price(), Price::from_dong(90_000));

        let line = product.to_selected(2);
        assert_eq!(line.line_price(), Price::from_dong(180_000));
        assert_eq!(line.product, ProductId::new("p1"));
    }
}
