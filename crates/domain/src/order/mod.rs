//! Order aggregate and status machine.

mod aggregate;
mod status;

pub use aggregate::{Order, OrderLine};
pub use status::OrderStatus;

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The requested status change is not an edge in the lifecycle graph.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
