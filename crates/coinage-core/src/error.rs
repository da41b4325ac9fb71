//! # Error Types
//!
//! Domain-specific error types for coinage-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coinage-core errors (this file)                                       │
//! │  ├── CoreError        - Everything a request or batch line can hit     │
//! │  ├── ValidationError  - Well-formed input that breaks a business rule  │
//! │  └── ParseError       - Batch line that is not "owed,paid"             │
//! │                                                                         │
//! │  coinage-cli errors (separate crate)                                   │
//! │  └── ConfigError      - Bad config file / env override                 │
//! │                                                                         │
//! │  Flow: ParseError/ValidationError → CoreError → ErrorCode → caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value, line shape)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a machine-readable [`ErrorCode`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Errors produced by the change engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested locale is not registered in the catalog.
    ///
    /// Fatal to the single request; in a batch it only fails the line.
    #[error("Unsupported locale: {locale}")]
    UnknownLocale { locale: String },

    /// Well-formed input that violates a business rule.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed batch line.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Internal guard tripped inside the calculator.
    ///
    /// ## When This Occurs
    /// - Negative change amount reached the calculator
    /// - Denomination list is empty or lacks the unit denomination
    ///
    /// Both mean the wiring upstream is broken, not that the user typed
    /// something wrong.
    #[error("Invalid calculator input: {reason}")]
    InvalidInput { reason: String },

    /// A locale definition was rejected at catalog construction.
    #[error("Invalid locale definition: {reason}")]
    InvalidCatalog { reason: String },
}

impl CoreError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::UnknownLocale { .. } => ErrorCode::UnknownLocale,
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::Parse(_) => ErrorCode::ParseError,
            CoreError::InvalidInput { .. } | CoreError::InvalidCatalog { .. } => {
                ErrorCode::InvalidInput
            }
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Business rule violations on otherwise well-formed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Customer handed over less than they owe.
    ///
    /// ## User Workflow
    /// ```text
    /// owed 5.00, paid 3.00
    ///      │
    ///      ▼
    /// InsufficientPayment { owed: 500, paid: 300 }
    ///      │
    ///      ▼
    /// Calculator is never invoked
    /// ```
    #[error("Insufficient payment: paid {paid} is less than owed {owed}")]
    InsufficientPayment { owed: Money, paid: Money },

    /// An amount was negative.
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },

    /// Divisor below 1.
    #[error("divisor must be at least 1, got {divisor}")]
    InvalidDivisor { divisor: i64 },

    /// Change exceeds the configured ceiling for the DP table.
    #[error("change of {change} minor units exceeds the maximum of {max}")]
    ChangeTooLarge { change: i64, max: i64 },
}

// =============================================================================
// Parse Error
// =============================================================================

/// A batch line that does not have the `amount_owed,amount_paid` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid format - expected 'amount_owed,amount_paid', found {found} field(s)")]
    WrongFieldCount { found: usize },

    #[error("Invalid number format - {field} '{value}' is not a number")]
    NotNumeric { field: String, value: String },

    #[error("Invalid number format - {field} '{value}' is negative")]
    NegativeValue { field: String, value: String },
}

// =============================================================================
// Error Code
// =============================================================================

/// Error codes surfaced in detailed reports and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    ParseError,
    ValidationError,
    UnknownLocale,
    InvalidInput,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
