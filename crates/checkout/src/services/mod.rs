//! External collaborator contracts.

pub mod directory;

pub use directory::{Directory, InMemoryDirectory};
