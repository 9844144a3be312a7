//! Cart-to-order transition engine.
//!
//! This crate drives the only part of the system with real invariants:
//! mutating a user's cart, converting it into an order while reserving
//! finite inventory, and walking the order through its status lifecycle
//! with stock restoration on cancellation.
//!
//! Checkout is all-or-nothing: either every cart line is reserved against
//! the ledger and an order materializes, or nothing changes. Cart mutations
//! for one user are serialized behind a per-user lock; users are independent
//! of each other.

pub mod carts;
pub mod error;
pub mod orders;
pub mod services;

pub use carts::{CartService, CartStore};
pub use error::{CheckoutError, Result};
pub use orders::{OrderService, OrderStore};
pub use services::{Directory, InMemoryDirectory};
