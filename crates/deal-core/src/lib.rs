#![deny(warnings)]

//! Core domain models and invariants for the dealer network.
//!
//! This crate defines the serializable catalog (dealers, products, shipping
//! tiers, debt and reward parameters), the mutable per-dealer save state and
//! the reputation-based unlock evaluation.

mod catalog;
mod state;
mod unlock;

pub use catalog::*;
pub use state::*;
pub use unlock::*;
