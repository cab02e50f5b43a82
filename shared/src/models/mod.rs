//! Data models shared between the cart service and its clients

mod cart;

pub use cart::{Cart, CartItem, CartView};
