//! Shared types used across the commerce engine.
//!
//! Identifier newtypes prevent mixing up users, orders, and products, and
//! `Money` keeps amounts in integer cents.

pub mod types;

pub use types::{Money, OrderId, ProductId, UserId};
