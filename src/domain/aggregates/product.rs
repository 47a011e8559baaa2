//! Product Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Price, Rating, StockLevel};

/// A catalog entry. Only the stock fields change after load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub discounted_price: Price,
    pub original_price: Price,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub reviews: u32,
    pub in_stock: bool,
    pub stock_quantity: StockLevel,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Removes `quantity` units, flooring at zero, and keeps `in_stock` in step.
    pub fn decrement_stock(&mut self, quantity: u32) {
        self.stock_quantity = self.stock_quantity.take(quantity);
        self.in_stock = !self.stock_quantity.is_empty();
    }

    pub fn restock(&mut self, quantity: u32) {
        self.stock_quantity = self.stock_quantity.put(quantity);
        self.in_stock = !self.stock_quantity.is_empty();
    }

    /// Repairs a stale `in_stock` flag and duplicate tags. Returns true when
    /// anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut repaired = false;
        let in_stock = !self.stock_quantity.is_empty();
        if self.in_stock != in_stock {
            self.in_stock = in_stock;
            repaired = true;
        }
        let before = self.tags.len();
        let mut seen = std::collections::HashSet::new();
        self.tags.retain(|t| seen.insert(t.clone()));
        repaired || self.tags.len() != before
    }

    /// Case-insensitive substring match over the searchable text fields and
    /// tags. `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.category, &self.subcategory, &self.brand]
            .into_iter()
            .chain(self.tags.iter())
            .any(|field| field.to_lowercase().contains(needle))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::product;

    #[test]
    fn test_decrement_never_negative() {
        let mut p = product(1, "Oak Table", "dining", 10000);
        p.stock_quantity = StockLevel::new(3);
        p.decrement_stock(5);
        assert_eq!(p.stock_quantity.value(), 0);
        assert!(!p.in_stock);
        p.restock(2);
        assert!(p.in_stock);
    }

    #[test]
    fn test_normalize_repairs_flag_and_tags() {
        let mut p = product(1, "Oak Table", "dining", 10000);
        p.stock_quantity = StockLevel::new(0);
        p.tags = vec!["oak".into(), "wood".into(), "oak".into()];
        assert!(p.normalize());
        assert!(!p.in_stock);
        assert_eq!(p.tags, vec!["oak", "wood"]);
        assert!(!p.normalize());
    }

    #[test]
    fn test_matches_text_checks_tags_and_brand() {
        let mut p = product(1, "Oak Table", "dining", 10000);
        p.brand = "Nordhaus".into();
        p.tags = vec!["Scandinavian".into()];
        assert!(p.matches_text("oak"));
        assert!(p.matches_text("nordh"));
        assert!(p.matches_text("scandi"));
        assert!(!p.matches_text("walnut"));
    }

    #[test]
    fn test_deserializes_camel_case() {
        let json = r#"{
            "id": 7, "title": "Lamp", "category": "office",
            "discountedPrice": 19.5, "originalPrice": 25,
            "rating": 4.2, "reviews": 12, "inStock": true, "stockQuantity": 4,
            "isFeatured": true, "createdAt": "2024-03-01T00:00:00Z"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.discounted_price, Price::from_cents(1950));
        assert!(p.is_featured);
        assert!(p.tags.is_empty());
    }
}
