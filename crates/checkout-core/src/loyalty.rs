//! # Loyalty Point Computation
//!
//! Pure math for the loyalty award granted at checkout. The ledger itself
//! (append-only transactions, maintained balance) lives in checkout-db.

use crate::money::Money;

/// Whole currency units per loyalty point: 1 point per 10 units spent.
const UNITS_PER_POINT: i64 = 10;

/// Points awarded for an order: `floor(order.sum / 10)` in whole currency
/// units. Negative or sub-threshold sums earn nothing.
///
/// ## Example
/// ```rust
/// use checkout_core::loyalty::points_for_order;
/// use checkout_core::Money;
///
/// assert_eq!(points_for_order(Money::from_cents(15_000)), 15); // $150 → 15
/// assert_eq!(points_for_order(Money::from_cents(999)), 0);     // $9.99 → 0
/// ```
pub fn points_for_order(sum: Money) -> i64 {
    if sum.is_negative() {
        return 0;
    }
    sum.major() / UNITS_PER_POINT
}
