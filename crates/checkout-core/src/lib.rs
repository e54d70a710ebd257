//! # checkout-core: Pure Business Logic for the Checkout Core
//!
//! This crate is the **heart** of the checkout system. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Core Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   checkout-service                              │   │
//! │  │    create_order ──► payment ──► loyalty award                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ checkout-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ calendar  │  │   │
//! │  │   │  Product  │  │   Money   │  │   rule    │  │  special  │  │   │
//! │  │   │   Order   │  │Multiplier │  │  engine   │  │   days    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  checkout-db (Database Layer)                   │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, PricingRule, Order, Payment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The pricing rule engine (`resolve`, `applicable_rules`)
//! - [`calendar`] - Closed special-day calendar (weekend, Mother's Day, ...)
//! - [`conditions`] - Product condition predicates (new / old / low_stock)
//! - [`loyalty`] - Loyalty point computation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **Explicit Time**: Rule resolution takes `now` as a parameter
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calendar;
pub mod conditions;
pub mod error;
pub mod loyalty;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use checkout_core::Money` instead of
// `use checkout_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Multiplier};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of days a product counts as "new" for the `new`/`old`
/// condition filters.
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 30;

/// Stock level below which the `low_stock` condition filter matches.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum quantity of a single item in a cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted rule priority. Priorities outside [0, MAX_RULE_PRIORITY]
/// are rejected at validation time.
pub const MAX_RULE_PRIORITY: i64 = 10_000;
