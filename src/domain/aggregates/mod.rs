//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod wishlist;

pub use product::Product;
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus, Review, ReviewStatus};
pub use cart::{Cart, CartError, CartItem};
pub use wishlist::Wishlist;
