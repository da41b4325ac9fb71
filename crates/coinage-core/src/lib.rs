//! # coinage-core: Change Calculation Engine
//!
//! Turns "owed / paid" into the pieces a cashier hands back, either with
//! the fewest pieces possible or with a deliberately varied mix.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Coinage Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    coinage-cli (binary)                         │   │
//! │  │    config ──► change / batch / locales subcommands              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coinage-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  batch    │─►│  service  │─►│calculator │  │  catalog  │  │   │
//! │  │   │ per line  │  │ validate  │  │ DP/random │◄─│  locales  │  │   │
//! │  │   └───────────┘  └─────┬─────┘  └───────────┘  └─────┬─────┘  │   │
//! │  │                        └──────────► format ◄──────────┘        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL RNG • IMMUTABLE CATALOG                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Denomination tables per locale
//! - [`calculator`] - Optimal and random decomposition
//! - [`format`] - "3 quarters,1 dime,3 pennies"
//! - [`service`] - Single-transaction contract
//! - [`batch`] - Line-by-line batch processing and reports
//! - [`money`] - Integer minor-unit money
//! - [`types`] - Requests, results, modes
//! - [`validation`] - Business rule checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: amounts are minor units (i64), decimals only at the edges
//! 2. **Injected Randomness**: every random draw comes from a caller-supplied `Rng`
//! 3. **Validate First**: bad input never reaches the calculator
//! 4. **Explicit Errors**: typed errors with machine-readable codes
//!
//! ## Example Usage
//!
//! ```rust
//! use coinage_core::{ChangeEngine, ChangeRequest, ModePolicy, Money};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let request = ChangeRequest {
//!     amount_owed: Money::from_cents(212),
//!     amount_paid: Money::from_cents(300),
//!     locale: "en-US".to_string(),
//!     divisor: 3,
//!     mode: ModePolicy::Optimal,
//! };
//!
//! let result = ChangeEngine::builtin()
//!     .calculate(&request, &mut StdRng::seed_from_u64(7))
//!     .unwrap();
//! assert_eq!(result.formatted_text, "3 quarters,1 dime,3 pennies");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod calculator;
pub mod catalog;
pub mod error;
pub mod format;
pub mod money;
pub mod service;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use batch::{BatchOutcome, BatchProcessor, BatchReport, DetailedReport};
pub use calculator::{ChangeStrategy, DivisorScope, RandomStrategy};
pub use catalog::{Denomination, DenominationCatalog, LocaleDefinition, SupportedLocales};
pub use error::{CoreError, CoreResult, ErrorCode, ParseError, ValidationError};
pub use money::Money;
pub use service::{CalculateChangeRequest, ChangeEngine, ChangeResponse, EngineSettings};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Locale used when a request does not name one.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Random-mode divisor used when a request does not name one.
pub const DEFAULT_DIVISOR: i64 = 3;

/// Formatted text for a zero change amount.
pub const NO_CHANGE_TEXT: &str = "No change due";

/// Largest change (minor units) the optimal DP will size a table for.
///
/// ## Business Reason
/// The DP table is O(change) memory. 10,000,000 cents is $100,000 of change,
/// far past any real till.
pub const MAX_CHANGE_MINOR_UNITS: i64 = 10_000_000;
