//! # Change Service
//!
//! The single-transaction contract and the engine that serves it.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CalculateChangeRequest { amount_owed: 2.12, amount_paid: 3.00, ... }  │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  1. Catalog lookup ──────────────► UnknownLocale                        │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  2. Decimal → minor units                                               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  3. validate_request ────────────► ValidationError (calculator untouched)│
//! │          │                                                              │
//! │          ▼                                                              │
//! │  4. ModePolicy → ChangeMode → ChangeStrategy::decompose                 │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  5. format_change                                                       │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ChangeResponse { change_amount: 0.88, change_cents: 88, ... }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::calculator::{ChangeStrategy, DivisorScope, RandomStrategy};
use crate::catalog::DenominationCatalog;
use crate::error::{CoreResult, ValidationError};
use crate::format::format_change;
use crate::money::Money;
use crate::types::{ChangeDecomposition, ChangeMode, ChangeRequest, ChangeResult, ModePolicy};
use crate::validation::validate_request;
use crate::{DEFAULT_DIVISOR, DEFAULT_LOCALE, MAX_CHANGE_MINOR_UNITS};

// =============================================================================
// Contract Types
// =============================================================================

/// Request body of the single-transaction contract.
///
/// ```json
/// { "amount_owed": 2.12, "amount_paid": 3.00, "locale": "en-US", "divisor": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculateChangeRequest {
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub amount_owed: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub amount_paid: Decimal,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_divisor")]
    #[ts(type = "number")]
    pub divisor: i64,

    /// Optional; `auto` when omitted.
    #[serde(default)]
    #[ts(optional)]
    pub mode: Option<ModePolicy>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_divisor() -> i64 {
    DEFAULT_DIVISOR
}

/// Response body of the single-transaction contract.
///
/// ```json
/// {
///   "change_amount": 0.88,
///   "change_cents": 88,
///   "denominations": { "dime": 1, "penny": 3, "quarter": 3 },
///   "formatted_change": "3 quarters,1 dime,3 pennies",
///   "is_random": false,
///   "locale": "en-US"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeResponse {
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub change_amount: Decimal,

    #[ts(type = "number")]
    pub change_cents: i64,

    pub denominations: ChangeDecomposition,

    pub formatted_change: String,

    pub is_random: bool,

    pub locale: String,
}

impl ChangeResponse {
    /// Builds the wire shape from an engine result.
    pub fn from_result(result: ChangeResult, minor_digits: u32) -> Self {
        ChangeResponse {
            change_amount: result.change.to_decimal(minor_digits),
            change_cents: result.change.minor_units(),
            is_random: result.mode.is_random(),
            denominations: result.decomposition,
            formatted_change: result.formatted_text,
            locale: result.locale,
        }
    }
}

// =============================================================================
// Engine Settings
// =============================================================================

/// Knobs that are fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Largest change the optimal DP will build a table for.
    pub max_change_minor_units: i64,

    /// Which denominations the random divisor compresses.
    pub divisor_scope: DivisorScope,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_change_minor_units: MAX_CHANGE_MINOR_UNITS,
            divisor_scope: DivisorScope::All,
        }
    }
}

// =============================================================================
// Change Engine
// =============================================================================

/// Validates, calculates and formats change for one transaction at a time.
///
/// Holds only shared, read-only state, so one engine can serve any number
/// of callers. Randomness is always passed in per call.
#[derive(Debug, Clone, Copy)]
pub struct ChangeEngine<'c> {
    catalog: &'c DenominationCatalog,
    settings: EngineSettings,
}

impl ChangeEngine<'static> {
    /// Engine over the built-in catalog with default settings.
    pub fn builtin() -> Self {
        ChangeEngine::new(DenominationCatalog::builtin(), EngineSettings::default())
    }
}

impl<'c> ChangeEngine<'c> {
    pub fn new(catalog: &'c DenominationCatalog, settings: EngineSettings) -> Self {
        ChangeEngine { catalog, settings }
    }

    pub fn catalog(&self) -> &'c DenominationCatalog {
        self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Converts a contract request into a domain request.
    ///
    /// Fails with `UnknownLocale` before looking at the amounts, and with
    /// `NegativeAmount` for negative or unrepresentable amounts.
    pub fn to_request(&self, body: &CalculateChangeRequest) -> CoreResult<ChangeRequest> {
        let locale = self.catalog.locale(&body.locale)?;
        Ok(ChangeRequest {
            amount_owed: self.to_money("amount_owed", body.amount_owed, locale.minor_digits)?,
            amount_paid: self.to_money("amount_paid", body.amount_paid, locale.minor_digits)?,
            locale: locale.id.clone(),
            divisor: body.divisor,
            mode: body.mode.unwrap_or_default(),
        })
    }

    /// Serves the single-transaction contract end to end.
    ///
    /// ```rust
    /// use coinage_core::service::{CalculateChangeRequest, ChangeEngine};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    /// use rust_decimal::Decimal;
    ///
    /// let body = CalculateChangeRequest {
    ///     amount_owed: Decimal::new(212, 2),
    ///     amount_paid: Decimal::new(300, 2),
    ///     locale: "en-US".into(),
    ///     divisor: 3,
    ///     mode: None,
    /// };
    /// let response = ChangeEngine::builtin()
    ///     .calculate_change(&body, &mut StdRng::seed_from_u64(1))
    ///     .unwrap();
    /// assert_eq!(response.change_cents, 88);
    /// assert_eq!(response.formatted_change, "3 quarters,1 dime,3 pennies");
    /// assert!(!response.is_random);
    /// ```
    pub fn calculate_change<R: Rng + ?Sized>(
        &self,
        body: &CalculateChangeRequest,
        rng: &mut R,
    ) -> CoreResult<ChangeResponse> {
        let request = self.to_request(body)?;
        let locale = self.catalog.locale(&request.locale)?;
        let result = self.calculate(&request, rng)?;
        Ok(ChangeResponse::from_result(result, locale.minor_digits))
    }

    /// Validates and computes one domain request.
    pub fn calculate<R: Rng + ?Sized>(
        &self,
        request: &ChangeRequest,
        rng: &mut R,
    ) -> CoreResult<ChangeResult> {
        let denominations = self.catalog.lookup(&request.locale)?;
        let change = validate_request(request, self.settings.max_change_minor_units)?;

        // Nothing to hand back: no strategy runs and nothing is random.
        let mode = if change.is_zero() {
            ChangeMode::Optimal
        } else {
            request.resolved_mode()
        };

        let strategy = ChangeStrategy::for_mode(
            mode,
            RandomStrategy::new(request.divisor).with_scope(self.settings.divisor_scope),
        );
        let decomposition = strategy.decompose(change, denominations, rng)?;
        let formatted_text = format_change(&decomposition, denominations);

        debug!(
            locale = %request.locale,
            change = change.minor_units(),
            %mode,
            pieces = decomposition.total_pieces(),
            "Change calculated"
        );

        Ok(ChangeResult {
            decomposition,
            change,
            formatted_text,
            mode,
            locale: request.locale.clone(),
        })
    }

    fn to_money(
        &self,
        field: &str,
        amount: Decimal,
        minor_digits: u32,
    ) -> Result<Money, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeAmount {
                field: field.to_string(),
            });
        }
        // Amounts too large for i64 minor units can never pass the size check.
        Money::from_decimal(amount, minor_digits).ok_or(ValidationError::ChangeTooLarge {
            change: i64::MAX,
            max: self.settings.max_change_minor_units,
        })
    }
}


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ErrorCode};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::str::FromStr;

    fn body(owed: &str, paid: &str) -> CalculateChangeRequest {
        CalculateChangeRequest {
            amount_owed: Decimal::from_str(owed).unwrap(),
            amount_paid: Decimal::from_str(paid).unwrap(),
            locale: "en-US".to_string(),
            divisor: 3,
            mode: None,
        }
    }

    #[test]
    fn test_scenario_a_optimal() {
        let mut request = body("2.12", "3.00");
        request.mode = Some(ModePolicy::Optimal);
        let response = ChangeEngine::builtin()
            .calculate_change(&request, &mut StepRng::new(0, 0))
            .unwrap();

        assert_eq!(response.change_cents, 88);
        assert_eq!(response.change_amount, Decimal::from_str("0.88").unwrap());
        assert_eq!(response.denominations.count("quarter"), 3);
        assert_eq!(response.denominations.count("dime"), 1);
        assert_eq!(response.denominations.count("penny"), 3);
        assert_eq!(response.formatted_change, "3 quarters,1 dime,3 pennies");
        assert!(!response.is_random);
        assert_eq!(response.locale, "en-US");
    }

    #[test]
    fn test_scenario_b_no_change() {
        let mut request = body("0", "0");
        request.mode = Some(ModePolicy::Random);
        let response = ChangeEngine::builtin()
            .calculate_change(&request, &mut StepRng::new(0, 0))
            .unwrap();

        assert_eq!(response.change_cents, 0);
        assert!(response.denominations.is_empty());
        assert_eq!(response.formatted_change, "No change due");
        assert!(!response.is_random);
    }

    #[test]
    fn test_scenario_c_insufficient_payment() {
        let err = ChangeEngine::builtin()
            .calculate_change(&body("5.00", "3.00"), &mut StepRng::new(0, 0))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(err.to_string().contains("Insufficient payment"));
    }

    #[test]
    fn test_auto_mode_follows_divisibility() {
        let engine = ChangeEngine::builtin();
        let mut rng = StdRng::seed_from_u64(42);

        let random = engine.calculate_change(&body("3.33", "5.00"), &mut rng).unwrap();
        assert!(random.is_random);
        assert_eq!(random.change_cents, 167);
        assert_eq!(
            random
                .denominations
                .total_value(engine.catalog().lookup("en-US").unwrap()),
            167
        );

        let optimal = engine.calculate_change(&body("2.12", "3.00"), &mut rng).unwrap();
        assert!(!optimal.is_random);
    }

    #[test]
    fn test_unknown_locale() {
        let mut request = body("1.00", "2.00");
        request.locale = "de-DE".to_string();
        let err = ChangeEngine::builtin()
            .calculate_change(&request, &mut StepRng::new(0, 0))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownLocale {
                locale: "de-DE".to_string()
            }
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = ChangeEngine::builtin()
            .calculate_change(&body("-1.00", "2.00"), &mut StepRng::new(0, 0))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::NegativeAmount {
                field: "amount_owed".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_divisor_rejected() {
        let mut request = body("1.00", "2.00");
        request.divisor = 0;
        let err = ChangeEngine::builtin()
            .calculate_change(&request, &mut StepRng::new(0, 0))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::InvalidDivisor { divisor: 0 })
        );
    }

    #[test]
    fn test_euro_locale() {
        let mut request = body("1.00", "2.00");
        request.locale = "fr-FR".to_string();
        request.mode = Some(ModePolicy::Optimal);
        let response = ChangeEngine::builtin()
            .calculate_change(&request, &mut StepRng::new(0, 0))
            .unwrap();
        assert_eq!(response.change_cents, 100);
        assert_eq!(response.formatted_change, "1 euro");
        assert_eq!(response.locale, "fr-FR");
    }

    #[test]
    fn test_size_ceiling() {
        let engine = ChangeEngine::new(
            DenominationCatalog::builtin(),
            EngineSettings {
                max_change_minor_units: 1_000,
                divisor_scope: DivisorScope::All,
            },
        );
        let err = engine
            .calculate_change(&body("0", "10.01"), &mut StepRng::new(0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::ChangeTooLarge { .. })
        ));
    }

    #[test]
    fn test_overflowing_amount_reports_configured_ceiling() {
        let engine = ChangeEngine::new(
            DenominationCatalog::builtin(),
            EngineSettings {
                max_change_minor_units: 1_000,
                divisor_scope: DivisorScope::All,
            },
        );
        let err = engine
            .calculate_change(
                &body("0", "100000000000000000"),
                &mut StepRng::new(0, 0),
            )
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::ChangeTooLarge {
                change: i64::MAX,
                max: 1_000
            })
        );
    }

    #[test]
    fn test_json_contract() {
        let request: CalculateChangeRequest =
            serde_json::from_str(r#"{"amount_owed": 2.12, "amount_paid": 3.00}"#).unwrap();
        assert_eq!(request.locale, "en-US");
        assert_eq!(request.divisor, 3);
        assert_eq!(request.mode, None);

        let response = ChangeEngine::builtin()
            .calculate_change(&request, &mut StepRng::new(0, 0))
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["change_amount"], serde_json::json!(0.88));
        assert_eq!(json["change_cents"], serde_json::json!(88));
        assert_eq!(json["denominations"]["quarter"], serde_json::json!(3));
        assert_eq!(json["formatted_change"], "3 quarters,1 dime,3 pennies");
        assert_eq!(json["is_random"], serde_json::json!(false));
    }

    #[test]
    fn test_large_amount() {
        let response = ChangeEngine::builtin()
            .calculate_change(&body("100.00", "1100.00"), &mut StepRng::new(0, 0))
            .unwrap();
        assert_eq!(response.change_cents, 100_000);
        assert_eq!(response.change_amount, Decimal::from_str("1000.00").unwrap());
    }
}
