//! # checkout-db: Database Layer for the Checkout Core
//!
//! This crate provides database access for the checkout system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Data Flow                                │
//! │                                                                         │
//! │  checkout-service (create_order, callbacks, loyalty award)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    checkout-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ product, cart │    │  (embedded)  │  │   │
//! │  │   │               │    │ rule, order   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ payment,      │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │ loyalty, addr │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## The One Mandatory Transactional Boundary
//!
//! [`repository::order::OrderRepository::create_checkout`] runs the stock
//! check-and-decrement, order/item inserts and cart destruction in a single
//! SQLite transaction. Concurrent checkouts racing for the same product's
//! last units cannot both succeed: the conditional decrement makes the
//! loser roll back with an insufficient-stock error.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::address::AddressRepository;
pub use repository::cart::CartRepository;
pub use repository::loyalty::LoyaltyLedger;
pub use repository::order::{CheckoutLine, OrderRepository};
pub use repository::payment::{generate_payment_id, PaymentRepository};
pub use repository::pricing_rule::PricingRuleRepository;
pub use repository::product::ProductRepository;
