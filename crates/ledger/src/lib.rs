//! Product catalog store and stock ledger.
//!
//! This crate owns per-product stock counters and is the only place they are
//! mutated. Reservation is an atomic compare-and-decrement, restoration an
//! atomic increment, and multi-line reservation is all-or-nothing: a failed
//! line rolls back every reservation already made in the same call.
//!
//! The [`Catalog`] trait is the read view other components get over the same
//! store: price, stock, and active flag come from the counters the ledger
//! guards, never from a second source of truth.

pub mod catalog;
pub mod error;
pub mod product;
pub mod stock;

pub use catalog::Catalog;
pub use error::{LedgerError, Result};
pub use product::{Product, StockLine};
pub use stock::StockLedger;
