//! # Validation Module
//!
//! Input validation utilities for the checkout core.
//!
//! ## Validation Strategy
//! Validation runs before business logic; the database adds a second layer
//! through NOT NULL / UNIQUE / CHECK constraints. Errors carry the field
//! name so the caller can correct the request.

use crate::error::ValidationError;
use crate::types::PricingRule;
use crate::{MAX_ITEM_QUANTITY, MAX_RULE_PRIORITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart/order item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a loyalty point amount (earn or redeem).
///
/// ## Rules
/// - Must be positive (> 0); the sign is decided by the operation
pub fn validate_point_amount(points: i64) -> ValidationResult<()> {
    if points <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "points".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Rule Validators
// =============================================================================

/// Validates a pricing rule before it is stored.
///
/// ## Rules
/// - fixed price, when set, must be positive
/// - multiplier must be within [0, 100000] bps (×0 to ×10)
/// - priority must be within [0, MAX_RULE_PRIORITY]
pub fn validate_rule(rule: &PricingRule) -> ValidationResult<()> {
    if let Some(fixed) = rule.fixed_price_cents {
        if fixed <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "fixed_price".to_string(),
            });
        }
    }

    if !(0..=100_000).contains(&rule.multiplier_bps) {
        return Err(ValidationError::OutOfRange {
            field: "multiplier".to_string(),
            min: 0,
            max: 100_000,
        });
    }

    if !(0..=MAX_RULE_PRIORITY).contains(&rule.priority) {
        return Err(ValidationError::OutOfRange {
            field: "priority".to_string(),
            min: 0,
            max: MAX_RULE_PRIORITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
