//! # Domain Types
//!
//! Value types that flow through the change engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ChangeRequest  │   │ ChangeDecomp.   │   │  ChangeResult   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  amount_owed    │──►│  name → count   │──►│  decomposition  │       │
//! │  │  amount_paid    │   │  Σ = change     │   │  change         │       │
//! │  │  locale         │   └─────────────────┘   │  formatted_text │       │
//! │  │  divisor        │                         │  mode, locale   │       │
//! │  │  mode (policy)  │                         └─────────────────┘       │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   ModePolicy    │   │   ChangeMode    │                             │
//! │  │  Optimal        │──►│  Optimal        │  (what actually ran)        │
//! │  │  Random         │   │  Random         │                             │
//! │  │  Auto           │   └─────────────────┘                             │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is created fresh per request and dropped with it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::catalog::Denomination;
use crate::money::Money;

// =============================================================================
// Change Mode
// =============================================================================

/// The decomposition strategy that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ChangeMode {
    /// Fewest pieces.
    Optimal,
    /// Exact but deliberately varied mix.
    Random,
}

impl ChangeMode {
    #[inline]
    pub fn is_random(&self) -> bool {
        matches!(self, ChangeMode::Random)
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeMode::Optimal => write!(f, "optimal"),
            ChangeMode::Random => write!(f, "random"),
        }
    }
}

// =============================================================================
// Mode Policy
// =============================================================================

/// How the caller wants the mode chosen.
///
/// ## Auto Resolution
/// ```text
/// owed = 3.33 (333 minor units), divisor = 3
///      │
///      ▼
/// 333 % 3 == 0 ──► Random
///
/// owed = 2.12 (212 minor units), divisor = 3
///      │
///      ▼
/// 212 % 3 == 2 ──► Optimal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ModePolicy {
    /// Always the minimum-piece decomposition.
    Optimal,
    /// Always the randomized decomposition.
    Random,
    /// Random when the owed amount divides evenly by the divisor.
    #[default]
    Auto,
}

impl ModePolicy {
    /// Picks the concrete mode for one transaction.
    pub fn resolve(&self, amount_owed: Money, divisor: i64) -> ChangeMode {
        match self {
            ModePolicy::Optimal => ChangeMode::Optimal,
            ModePolicy::Random => ChangeMode::Random,
            ModePolicy::Auto if amount_owed.is_divisible_by(divisor) => ChangeMode::Random,
            ModePolicy::Auto => ChangeMode::Optimal,
        }
    }
}

impl fmt::Display for ModePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModePolicy::Optimal => write!(f, "optimal"),
            ModePolicy::Random => write!(f, "random"),
            ModePolicy::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ModePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optimal" | "min" | "minimum" => Ok(ModePolicy::Optimal),
            "random" => Ok(ModePolicy::Random),
            "auto" => Ok(ModePolicy::Auto),
            other => Err(format!(
                "Unknown mode: '{}'. Valid options: optimal, random, auto",
                other
            )),
        }
    }
}

// =============================================================================
// Change Request
// =============================================================================

/// One transaction, already converted to minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub amount_owed: Money,
    pub amount_paid: Money,
    pub locale: String,
    pub divisor: i64,
    pub mode: ModePolicy,
}

impl ChangeRequest {
    /// Change due; negative when the payment is short.
    #[inline]
    pub fn change(&self) -> Money {
        self.amount_paid - self.amount_owed
    }

    /// The mode this request runs in.
    #[inline]
    pub fn resolved_mode(&self) -> ChangeMode {
        self.mode.resolve(self.amount_owed, self.divisor)
    }
}

// =============================================================================
// Change Decomposition
// =============================================================================

/// Piece counts keyed by denomination (singular) name.
///
/// ## Invariant
/// Produced by the calculator so that `Σ count × value == change` exactly.
/// Zero counts are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeDecomposition(#[ts(type = "Record<string, number>")] BTreeMap<String, u64>);

impl ChangeDecomposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` pieces of `name`. Zero is a no-op.
    pub fn add(&mut self, name: &str, count: u64) {
        if count == 0 {
            return;
        }
        *self.0.entry(name.to_string()).or_insert(0) += count;
    }

    /// Pieces of `name`, zero if absent.
    pub fn count(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of physical pieces.
    pub fn total_pieces(&self) -> u64 {
        self.0.values().sum()
    }

    /// Weighted sum against a denomination table.
    ///
    /// Names missing from `denominations` contribute nothing.
    pub fn total_value(&self, denominations: &[Denomination]) -> i64 {
        denominations
            .iter()
            .map(|d| d.value * self.count(&d.name) as i64)
            .sum()
    }

    /// (name, count) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

impl FromIterator<(String, u64)> for ChangeDecomposition {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut decomposition = ChangeDecomposition::new();
        for (name, count) in iter {
            decomposition.add(&name, count);
        }
        decomposition
    }
}

// =============================================================================
// Change Result
// =============================================================================

/// A fully computed answer for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeResult {
    pub decomposition: ChangeDecomposition,
    pub change: Money,
    pub formatted_text: String,
    pub mode: ChangeMode,
    pub locale: String,
}

// =============================================================================
// Transaction Line
// =============================================================================

/// The two amounts parsed from one batch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionLine {
    pub amount_owed: Money,
    pub amount_paid: Money,
}

impl TransactionLine {
    /// Lifts the parsed amounts into a full request.
    pub fn into_request(self, locale: &str, divisor: i64, mode: ModePolicy) -> ChangeRequest {
        ChangeRequest {
            amount_owed: self.amount_owed,
            amount_paid: self.amount_paid,
            locale: locale.to_string(),
            divisor,
            mode,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
