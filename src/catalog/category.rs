//! The fixed storefront category set.

use serde::Serialize;

/// Known category identifiers with their display names, in menu order.
pub const CATEGORIES: [(&str, &str); 5] = [
    ("living-room", "Living Room"),
    ("bedroom", "Bedroom"),
    ("dining", "Dining"),
    ("office", "Office"),
    ("outdoor", "Outdoor"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: &'static str,
    pub name: &'static str,
    pub count: usize,
}

pub fn is_known(category: &str) -> bool {
    CATEGORIES.iter().any(|(id, _)| *id == category)
}
