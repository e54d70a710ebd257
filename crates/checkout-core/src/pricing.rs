//! # Pricing Rule Engine
//!
//! Resolves the authoritative unit price of a product at a point in time
//! from a set of time/condition-scoped rules.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       resolve(product, rules, now)                      │
//! │                                                                         │
//! │  candidate rules (global ∪ associated, loaded by the repository)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filter: date range ∧ time window ∧ special day ∧ condition filter      │
//! │       │                                                                 │
//! │       ├── none applicable ──► product.base_price                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  winner = max priority, ties broken by lowest rule id                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price = fixed_price if set, else base_price × multiplier               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  clamp to ≥ 0                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//! `now` is an explicit parameter; the engine never reads a clock. Equal
//! inputs always produce the same winning rule: among applicable rules of
//! equal priority the lexicographically lowest rule id wins.

use chrono::{DateTime, Utc};

use crate::calendar::SpecialDay;
use crate::conditions::ConditionFilter;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{PricingRule, Product};

// =============================================================================
// Applicability
// =============================================================================

/// Whether a candidate rule applies to `product` at `instant`.
///
/// All set constraints must hold. The date range is compared date-only
/// (UTC, inclusive both ends). The time-of-day window only constrains the
/// rule when both bounds are set; a window with `end < start` never
/// matches (it does not wrap past midnight — documented limitation).
pub fn is_applicable(
    rule: &PricingRule,
    product: &Product,
    instant: DateTime<Utc>,
) -> CoreResult<bool> {
    let date = instant.date_naive();
    let time = instant.time();

    if let Some(start) = rule.start_date {
        if date < start {
            return Ok(false);
        }
    }
    if let Some(end) = rule.end_date {
        if date > end {
            return Ok(false);
        }
    }

    if let (Some(start), Some(end)) = (rule.start_time, rule.end_time) {
        // end < start never matches; no wrap past midnight
        if end < start || time < start || time > end {
            return Ok(false);
        }
    }

    if let Some(tag) = &rule.special_day {
        // Unknown tags never match (closed calendar, not an error)
        match SpecialDay::parse(tag) {
            Some(day) if day.matches(date) => {}
            _ => return Ok(false),
        }
    }

    if let Some(tag) = &rule.condition_filter {
        // Unimplemented predicates fail explicitly
        let filter = ConditionFilter::parse(tag)?;
        if !filter.evaluate(product, instant)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Filters the candidate set down to the rules applicable at `instant`.
///
/// The candidate set (global rules ∪ rules associated with the product)
/// is assembled by the repository; this function is pure.
pub fn applicable_rules<'a>(
    product: &Product,
    candidates: &'a [PricingRule],
    instant: DateTime<Utc>,
) -> CoreResult<Vec<&'a PricingRule>> {
    let mut applicable = Vec::new();
    for rule in candidates {
        if is_applicable(rule, product, instant)? {
            applicable.push(rule);
        }
    }
    Ok(applicable)
}

// =============================================================================
// Winner Selection
// =============================================================================

/// Picks the winning rule: highest priority, ties broken by lowest rule id.
///
/// The tie-break is deterministic by construction; it does not depend on
/// the order rules were loaded in.
pub fn select_winner<'a>(applicable: &[&'a PricingRule]) -> Option<&'a PricingRule> {
    applicable
        .iter()
        .copied()
        .min_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)))
}

// =============================================================================
// Price Computation
// =============================================================================

/// Computes the price a winning rule yields for a product.
///
/// `fixed_price` wins over the multiplier. The multiplier is applied in
/// basis points with rounding; the result is clamped to a minimum of zero.
pub fn rule_price(product: &Product, rule: &PricingRule) -> Money {
    let price = match rule.fixed_price() {
        Some(fixed) => fixed,
        None => product.base_price().apply(rule.multiplier()),
    };
    price.clamp_non_negative()
}

/// Resolves the authoritative unit price of `product` at `instant`.
///
/// Returns the base price when no stored rule is applicable.
pub fn resolve(
    product: &Product,
    candidates: &[PricingRule],
    instant: DateTime<Utc>,
) -> CoreResult<Money> {
    let applicable = applicable_rules(product, candidates, instant)?;
    Ok(match select_winner(&applicable) {
        Some(rule) => rule_price(product, rule),
        None => product.base_price().clamp_non_negative(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
