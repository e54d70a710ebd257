//! Repository implementations.
//!
//! Each repository owns the SQL for one aggregate. Repositories are cheap
//! to construct (they clone the pool handle) and are handed out by
//! [`crate::Database`].

pub mod address;
pub mod cart;
pub mod loyalty;
pub mod order;
pub mod payment;
pub mod pricing_rule;
pub mod product;
