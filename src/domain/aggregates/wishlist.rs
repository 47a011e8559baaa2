//! Wishlist Aggregate

use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    session_id: String,
    product_ids: Vec<u64>,
}

impl Wishlist {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), product_ids: vec![] }
    }

    pub fn product_ids(&self) -> &[u64] { &self.product_ids }
    pub fn contains(&self, product_id: u64) -> bool { self.product_ids.contains(&product_id) }
    pub fn is_empty(&self) -> bool { self.product_ids.is_empty() }

    /// Adds the product if absent, removes it otherwise. Returns true when added.
    pub fn toggle(&mut self, product_id: u64) -> bool {
        if self.remove(product_id) {
            return false;
        }
        self.product_ids.push(product_id);
        true
    }

    pub fn remove(&mut self, product_id: u64) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|id| *id != product_id);
        self.product_ids.len() != before
    }
}
