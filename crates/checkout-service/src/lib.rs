//! # checkout-service: Checkout Orchestrator
//!
//! Composes the three lower crates into the operations callers actually
//! invoke.
//!
//! ## Orchestration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        create_order(user, ...)                          │
//! │                                                                         │
//! │  load cart + items ──▶ verify address ownership                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price every line (checkout-core pricing, one instant for all)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout transaction (checkout-db): stock, order, items, cart          │
//! │       │                                                                 │
//! │       ├──▶ award loyalty points on the committed sum                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  payment: COD → Pending row                                             │
//! │           Online → provider redirect URL, then Pending row              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A provider failure on the online path aborts the payment-creation step
//! only: the order is already committed and keeps its stock.

pub mod error;
pub mod orchestrator;

pub use error::{CheckoutError, CheckoutResult};
pub use orchestrator::{CheckoutOutcome, CheckoutService, CreateOrderRequest, OrderView};
