//! # Domain Types
//!
//! Core domain types used throughout the checkout system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  base_price     │   │  status         │   │  order_id (1:1) │       │
//! │  │  stock_quantity │   │  sum_cents      │   │  status         │       │
//! │  │  is_active      │   │  items (snap)   │   │  amount_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PricingRule    │   │   Cart/Item     │   │ LoyaltyTxn      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  windows, tags  │   │  one per user   │   │  append-only    │       │
//! │  │  priority       │   │  ephemeral      │   │  points_delta   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Direction
//! Entities reference each other by id only (order_id, product_id, ...).
//! There are no embedded back-pointers; navigation is one-directional.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Multiplier};

// =============================================================================
// Product
// =============================================================================

/// A product as seen by the checkout core.
///
/// Owned by the catalog collaborator; the core only reads the base price,
/// stock level, active flag and creation time, and decrements stock during
/// checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, snapshotted into order items at checkout.
    pub name: String,

    /// Base price in cents. The authoritative price is resolved through
    /// the pricing rule engine; this is the fallback.
    pub base_price_cents: i64,

    /// Current stock level.
    pub stock_quantity: i64,

    /// Whether product can be sold.
    pub is_active: bool,

    /// When the product was created (drives the new/old condition filters).
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }
}

// =============================================================================
// Pricing Rule
// =============================================================================

/// A time/condition-scoped pricing rule.
///
/// ## Applicability
/// A rule applies at an instant iff ALL of its optional constraints hold
/// (date range, time-of-day window, special day, condition filter). A rule
/// with none of them set is always applicable whenever in scope.
///
/// ## Scope
/// `applies_to_all = true` makes the rule global; otherwise it applies only
/// to the products associated through the `pricing_rule_products` table.
///
/// `special_day` and `condition_filter` are stored as raw tags and parsed
/// into the closed [`crate::calendar::SpecialDay`] /
/// [`crate::conditions::ConditionFilter`] enums at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PricingRule {
    /// Unique identifier (UUID v4). Also the deterministic tie-breaker:
    /// among equal-priority applicable rules the lowest id wins.
    pub id: String,

    /// Global scope flag. Global rules are candidates for every product.
    pub applies_to_all: bool,

    /// Optional special-day tag ("weekend", "christmas", ...).
    /// Unknown tags never match.
    pub special_day: Option<String>,

    /// Optional time-of-day window start. The window only constrains the
    /// rule when both bounds are set.
    pub start_time: Option<NaiveTime>,

    /// Optional time-of-day window end. A window with end < start never
    /// matches (no wrap past midnight).
    pub end_time: Option<NaiveTime>,

    /// Optional date range start (inclusive, date-only, UTC).
    pub start_date: Option<NaiveDate>,

    /// Optional date range end (inclusive, date-only, UTC).
    pub end_date: Option<NaiveDate>,

    /// Optional product condition tag ("new", "old", "low_stock").
    /// Unimplemented tags fail explicitly at evaluation.
    pub condition_filter: Option<String>,

    /// Price multiplier in basis points (10000 = ×1.0).
    pub multiplier_bps: i64,

    /// Optional fixed price in cents. When set it wins over the multiplier.
    pub fixed_price_cents: Option<i64>,

    /// Rule priority; higher wins among applicable rules.
    pub priority: i64,

    /// When the rule was created.
    pub created_at: DateTime<Utc>,
}

impl PricingRule {
    /// Returns the multiplier as a typed value.
    #[inline]
    pub fn multiplier(&self) -> Multiplier {
        Multiplier::from_bps(self.multiplier_bps)
    }

    /// Returns the fixed price, if set.
    #[inline]
    pub fn fixed_price(&self) -> Option<Money> {
        self.fixed_price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ephemeral pre-order state. One cart per user; destroyed atomically when
/// converted into an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A line in a cart, identified by the unique (cart_id, product_id) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
///
/// Status and tracking number are the only mutable fields of an order;
/// everything else (items, snapshots, sum) is frozen at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, awaiting payment/processing.
    Pending,
    /// Order accepted and being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order delivered to the customer.
    Delivered,
    /// Order cancelled by an operator.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Redirect-based payment through the external provider.
    Online,
    /// Cash on delivery; settled by an explicit operator action.
    CashOnDelivery,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment lifecycle. Completed and Failed are terminal: no transition is
/// permitted out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Initial state; awaiting a callback or operator action.
    Pending,
    /// Terminal: provider (or operator, for COD) confirmed the payment.
    Completed,
    /// Terminal: provider rejected or operator voided the payment.
    Failed,
}

impl PaymentStatus {
    /// Whether this status is terminal.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// An immutable order created by checkout.
///
/// `sum_cents` is the snapshot-weighted total and must equal
/// `Σ(item.price_cents × item.quantity)` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub address_id: String,
    pub tracking_number: Option<String>,
    pub status: OrderStatus,
    pub sum_cents: i64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn sum(&self) -> Money {
        Money::from_cents(self.sum_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze price and product name at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Unit price in cents at order time (frozen).
    pub price_cents: i64,
    /// Product name at order time (frozen).
    pub name_snapshot: String,
    /// Quantity ordered.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the line total (snapshot price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment bound 1:1 to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Amount in cents; equals the order sum at creation.
    pub amount_cents: i64,
    /// External provider transaction id, once known.
    pub transaction_id: Option<String>,
    /// Opaque JSON blob with provider metadata (redirect URL, bank codes).
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Address
// =============================================================================

/// A shipping address. Full address CRUD lives in a collaborator; checkout
/// only loads it and verifies ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Address {
    pub id: String,
    pub user_id: String,
    pub line1: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Loyalty
// =============================================================================

/// An append-only loyalty ledger entry. Rows are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoyaltyTransaction {
    pub id: String,
    pub user_id: String,
    /// Positive for earns, negative for redemptions.
    pub points_delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
