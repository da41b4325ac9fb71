//! # Validation Module
//!
//! Business rule checks that run before the calculator is ever invoked.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary (service / batch parser)                            │
//! │  ├── Decimal parsing, field count                                      │
//! │  └── → ParseError                                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── amounts non-negative, paid ≥ owed                                 │
//! │  ├── divisor ≥ 1, change under the DP ceiling                          │
//! │  └── → ValidationError                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculator guards                                            │
//! │  └── → InvalidInput (should be unreachable from user input)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coinage_core::money::Money;
//! use coinage_core::validation::{validate_divisor, validate_payment};
//!
//! assert!(validate_divisor(3).is_ok());
//! assert!(validate_payment(Money::from_cents(500), Money::from_cents(300)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ChangeRequest;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates the random-mode divisor.
///
/// ## Rules
/// - Must be at least 1
pub fn validate_divisor(divisor: i64) -> ValidationResult<()> {
    if divisor < 1 {
        return Err(ValidationError::InvalidDivisor { divisor });
    }
    Ok(())
}

/// Validates that an amount is not negative.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that the payment covers the amount owed.
///
/// ## User Workflow
/// ```text
/// owed 5.00, paid 3.00
///      │
///      ▼
/// validate_payment ← THIS FUNCTION
///      │
///      ├── paid < owed → "Insufficient payment ..."
///      │
///      └── OK → change = paid - owed
/// ```
pub fn validate_payment(owed: Money, paid: Money) -> ValidationResult<Money> {
    if paid < owed {
        return Err(ValidationError::InsufficientPayment { owed, paid });
    }
    Ok(paid - owed)
}

/// Validates that the change fits under the DP table ceiling.
pub fn validate_change_size(change: Money, max_minor_units: i64) -> ValidationResult<()> {
    if change.minor_units() > max_minor_units {
        return Err(ValidationError::ChangeTooLarge {
            change: change.minor_units(),
            max: max_minor_units,
        });
    }
    Ok(())
}

/// Runs every request-level rule and returns the change due.
///
/// Rules are checked in a fixed order so the first reported problem is
/// stable: owed, paid, divisor, payment, size.
pub fn validate_request(request: &ChangeRequest, max_minor_units: i64) -> ValidationResult<Money> {
    validate_amount("amount_owed", request.amount_owed)?;
    validate_amount("amount_paid", request.amount_paid)?;
    validate_divisor(request.divisor)?;
    let change = validate_payment(request.amount_owed, request.amount_paid)?;
    validate_change_size(change, max_minor_units)?;
    Ok(change)
}

// =============================================================================
// Unit Tests
// =============================================================================
