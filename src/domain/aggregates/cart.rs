//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use crate::domain::value_objects::Price;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    session_id: String,
    items: Vec<CartItem>,
    subtotal: Price,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: u64,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartItem {
    pub fn line_total(&self) -> Price { self.unit_price.times(self.quantity) }
}

impl Cart {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), items: vec![], subtotal: Price::ZERO, updated_at: Utc::now() }
    }

    pub fn session_id(&self) -> &str { &self.session_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> Price { self.subtotal }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn quantity_of(&self, product_id: u64) -> u32 {
        self.items.iter().find(|i| i.product_id == product_id).map_or(0, |i| i.quantity)
    }

    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.recalculate();
    }

    /// Sets the quantity for a line, removing it at zero. Returns the previous
    /// quantity.
    pub fn update_quantity(&mut self, product_id: u64, quantity: u32) -> Result<u32, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;
        let previous = match quantity {
            0 => self.items.remove(index).quantity,
            n => std::mem::replace(&mut self.items[index].quantity, n),
        };
        self.recalculate();
        Ok(previous)
    }

    pub fn remove_item(&mut self, product_id: u64) -> Result<CartItem, CartError> {
        let pos = self.items.iter().position(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound(product_id))?;
        let item = self.items.remove(pos);
        self.recalculate();
        Ok(item)
    }

    pub fn clear(&mut self) -> Vec<CartItem> {
        let removed = std::mem::take(&mut self.items);
        self.recalculate();
        removed
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Price::ZERO, |acc, i| acc.plus(i.line_total()));
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("product {0} is not in the cart")]
    ItemNotFound(u64),
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("only {available} of product {product_id} in stock")]
    InsufficientStock { product_id: u64, available: u32 },
}
