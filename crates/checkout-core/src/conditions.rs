//! # Product Condition Filters
//!
//! Predicates a pricing rule can attach to the product it prices.
//!
//! Unlike special-day tags (where an unknown tag simply never matches),
//! an unrecognized or unimplemented condition tag fails with
//! [`CoreError::NotImplemented`]: a rule that asks for a predicate the
//! engine cannot evaluate must not silently default to true or false.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::{LOW_STOCK_THRESHOLD, NEW_PRODUCT_WINDOW_DAYS};

/// The closed set of condition filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFilter {
    /// Product created within the last 30 days of the evaluation instant.
    New,
    /// Product older than 30 days.
    Old,
    /// Stock below the fixed threshold (10).
    LowStock,
    /// Recognized tag with no implemented predicate; always errors.
    HighDemand,
}

impl ConditionFilter {
    /// Parses a stored tag into a condition filter.
    ///
    /// Unrecognized tags are an error: the rule was stored with a
    /// predicate this engine has never heard of.
    pub fn parse(tag: &str) -> CoreResult<ConditionFilter> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(ConditionFilter::New),
            "old" => Ok(ConditionFilter::Old),
            "low_stock" => Ok(ConditionFilter::LowStock),
            "high_demand" => Ok(ConditionFilter::HighDemand),
            other => Err(CoreError::NotImplemented(other.to_string())),
        }
    }

    /// Evaluates the predicate against a product at `now`.
    pub fn evaluate(&self, product: &Product, now: DateTime<Utc>) -> CoreResult<bool> {
        match self {
            ConditionFilter::New => Ok(is_new(product, now)),
            ConditionFilter::Old => Ok(!is_new(product, now)),
            ConditionFilter::LowStock => Ok(product.stock_quantity < LOW_STOCK_THRESHOLD),
            ConditionFilter::HighDemand => {
                Err(CoreError::NotImplemented("high_demand".to_string()))
            }
        }
    }
}

/// A product is "new" when created within the last 30 days of `now`.
fn is_new(product: &Product, now: DateTime<Utc>) -> bool {
    now - product.created_at <= Duration::days(NEW_PRODUCT_WINDOW_DAYS)
}

// =============================================================================
// Unit Tests
// =============================================================================
