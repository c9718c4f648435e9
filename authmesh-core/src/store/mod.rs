//! Token storage backends.
//!
//! This module provides:
//! - [`MemoryTokenSet`] - In-memory [`TokenSet`](crate::token::TokenSet) implementation
//!
//! Other backends (databases, OS keyrings) can implement
//! [`TokenSet`](crate::token::TokenSet) without changing its contract.

mod memory;

pub use memory::MemoryTokenSet;
