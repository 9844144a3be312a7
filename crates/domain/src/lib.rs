//! Domain layer for the commerce engine.
//!
//! This crate provides the two aggregates at the heart of the cart-to-order
//! transition:
//! - `Cart`: per-user scratch space with price snapshots taken at add-time
//! - `Order`: the immutable record produced by checkout, driven through a
//!   single status transition table
//!
//! Aggregates here are pure state + rules; availability checks, stock
//! reservation, and persistence live in the `ledger` and `checkout` crates.

pub mod cart;
pub mod order;

pub use cart::{Cart, CartError, CartLine};
pub use order::{Order, OrderError, OrderLine, OrderStatus};
