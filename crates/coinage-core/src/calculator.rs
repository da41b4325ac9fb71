//! # Change Calculator
//!
//! Turns a change amount into physical pieces.
//!
//! ## Strategies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ChangeStrategy                                   │
//! │                                                                         │
//! │  OPTIMAL                             │  RANDOM                          │
//! │  ───────                             │  ──────                          │
//! │  Unbounded-supply min-coin DP        │  Top-down bounded sampling       │
//! │  O(change × pieces) time             │  O(pieces) time                  │
//! │  O(change) memory                    │  O(1) extra memory               │
//! │  Deterministic                       │  Reproducible under a seed       │
//! │  Works for non-greedy currencies     │  Unit piece absorbs remainder    │
//! │                                      │                                  │
//! │  88¢ ──► 3 quarters,1 dime,3 pennies │  88¢ ──► e.g. 1 quarter,2 dimes, │
//! │                                      │          1 nickel,38 pennies     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both strategies return a [`ChangeDecomposition`] whose weighted sum is
//! exactly the requested change.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Denomination;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ChangeDecomposition, ChangeMode};

// =============================================================================
// Strategy Types
// =============================================================================

/// Which denominations the random divisor compresses.
///
/// Whether the upstream behavior applies the divisor to every piece or
/// only to large ones is not settled, so both readings are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisorScope {
    /// Every non-unit denomination.
    #[default]
    All,
    /// Only denominations worth at least this many minor units; smaller
    /// non-unit pieces sample their full affordable range.
    AtLeast(i64),
}

impl DivisorScope {
    #[inline]
    fn applies_to(&self, denomination: &Denomination) -> bool {
        match self {
            DivisorScope::All => true,
            DivisorScope::AtLeast(min_value) => denomination.value >= *min_value,
        }
    }
}

/// Parameters of the random strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomStrategy {
    /// Compresses each draw range to `[0, floor(affordable / divisor)]`.
    pub divisor: i64,

    #[serde(default)]
    pub scope: DivisorScope,
}

impl RandomStrategy {
    pub fn new(divisor: i64) -> Self {
        RandomStrategy {
            divisor,
            scope: DivisorScope::All,
        }
    }

    pub fn with_scope(mut self, scope: DivisorScope) -> Self {
        self.scope = scope;
        self
    }

    /// Samples an exact decomposition of `change`.
    ///
    /// ## Walk
    /// ```text
    /// remaining = change
    /// for each non-unit piece, highest value first:
    ///     affordable = remaining / value
    ///     ceiling    = affordable / divisor      (if the scope applies)
    ///     count      ~ Uniform[0, ceiling]
    ///     remaining -= count × value
    /// unit piece    = remaining                  ← makes the sum exact
    /// ```
    pub fn decompose<R: Rng + ?Sized>(
        &self,
        change: Money,
        denominations: &[Denomination],
        rng: &mut R,
    ) -> CoreResult<ChangeDecomposition> {
        if self.divisor < 1 {
            return Err(CoreError::invalid_input(format!(
                "divisor must be at least 1, got {}",
                self.divisor
            )));
        }
        let ordered = ordered_denominations(change, denominations)?;
        let unit = ordered
            .iter()
            .copied()
            .find(|d| d.is_unit())
            .ok_or_else(|| CoreError::invalid_input("denomination list has no unit piece"))?;

        let mut remaining = change.minor_units();
        let mut decomposition = ChangeDecomposition::new();

        for denomination in ordered.iter().filter(|d| !d.is_unit()) {
            let affordable = remaining / denomination.value;
            let ceiling = if self.scope.applies_to(denomination) {
                affordable / self.divisor
            } else {
                affordable
            };
            if ceiling == 0 {
                continue;
            }

            let count = rng.gen_range(0..=ceiling);
            remaining -= count * denomination.value;
            decomposition.add(&denomination.name, count as u64);
        }

        decomposition.add(&unit.name, remaining as u64);

        debug_assert_eq!(decomposition.total_value(denominations), change.minor_units());
        Ok(decomposition)
    }
}

/// The closed set of decomposition strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStrategy {
    Optimal,
    Random(RandomStrategy),
}

impl ChangeStrategy {
    /// Strategy for a resolved mode.
    pub fn for_mode(mode: ChangeMode, random: RandomStrategy) -> Self {
        match mode {
            ChangeMode::Optimal => ChangeStrategy::Optimal,
            ChangeMode::Random => ChangeStrategy::Random(random),
        }
    }

    pub fn mode(&self) -> ChangeMode {
        match self {
            ChangeStrategy::Optimal => ChangeMode::Optimal,
            ChangeStrategy::Random(_) => ChangeMode::Random,
        }
    }

    /// Runs this strategy. The optimal strategy never touches `rng`.
    pub fn decompose<R: Rng + ?Sized>(
        &self,
        change: Money,
        denominations: &[Denomination],
        rng: &mut R,
    ) -> CoreResult<ChangeDecomposition> {
        match self {
            ChangeStrategy::Optimal => compute_optimal(change, denominations),
            ChangeStrategy::Random(random) => random.decompose(change, denominations, rng),
        }
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Minimum-piece decomposition via dynamic programming.
///
/// ## Table
/// ```text
/// min_pieces[0] = 0
/// min_pieces[a] = 1 + min(min_pieces[a - d]) for every piece d ≤ a
/// best[a]       = the d that achieved it (largest d on ties)
/// ```
///
/// Reconstruction walks `best` down from the target with a flat loop.
/// Ties go to the largest piece.
///
/// ```rust
/// use coinage_core::calculator::compute_optimal;
/// use coinage_core::catalog::DenominationCatalog;
/// use coinage_core::money::Money;
///
/// let usd = DenominationCatalog::builtin().lookup("en-US").unwrap();
/// let change = compute_optimal(Money::from_cents(88), usd).unwrap();
/// assert_eq!(change.count("quarter"), 3);
/// assert_eq!(change.count("dime"), 1);
/// assert_eq!(change.count("penny"), 3);
/// ```
pub fn compute_optimal(
    change: Money,
    denominations: &[Denomination],
) -> CoreResult<ChangeDecomposition> {
    let ordered = ordered_denominations(change, denominations)?;
    if ordered.len() > usize::from(NO_PIECE) {
        return Err(CoreError::invalid_input(format!(
            "too many denominations ({})",
            ordered.len()
        )));
    }

    let target = usize::try_from(change.minor_units())
        .map_err(|_| CoreError::invalid_input("change amount does not fit in memory"))?;

    let mut min_pieces = dp_table(target + 1, UNREACHABLE)?;
    let mut best = dp_table(target + 1, NO_PIECE)?;
    min_pieces[0] = 0;

    for amount in 1..=target {
        for (index, denomination) in ordered.iter().enumerate() {
            let value = denomination.value as usize;
            if value > amount {
                continue;
            }
            let previous = min_pieces[amount - value];
            if previous != UNREACHABLE && previous + 1 < min_pieces[amount] {
                min_pieces[amount] = previous + 1;
                best[amount] = index as u16;
            }
        }
    }

    if min_pieces[target] == UNREACHABLE {
        return Err(CoreError::invalid_input(format!(
            "cannot make change for {} minor units with the given denominations",
            target
        )));
    }

    let mut counts = vec![0u64; ordered.len()];
    let mut amount = target;
    while amount > 0 {
        let index = usize::from(best[amount]);
        counts[index] += 1;
        amount -= ordered[index].value as usize;
    }

    let mut decomposition = ChangeDecomposition::new();
    for (denomination, count) in ordered.iter().zip(counts) {
        decomposition.add(&denomination.name, count);
    }
    Ok(decomposition)
}

/// Randomized exact decomposition with the divisor applied to every
/// non-unit piece. See [`RandomStrategy::decompose`].
pub fn compute_random<R: Rng + ?Sized>(
    change: Money,
    denominations: &[Denomination],
    divisor: i64,
    rng: &mut R,
) -> CoreResult<ChangeDecomposition> {
    RandomStrategy::new(divisor).decompose(change, denominations, rng)
}

// =============================================================================
// Internals
// =============================================================================

const UNREACHABLE: u32 = u32::MAX;
const NO_PIECE: u16 = u16::MAX;

/// A `len`-entry table, or `InvalidInput` if it cannot be allocated.
fn dp_table<T: Clone>(len: usize, fill: T) -> CoreResult<Vec<T>> {
    let mut table = Vec::new();
    table.try_reserve_exact(len).map_err(|_| {
        CoreError::invalid_input(format!(
            "cannot allocate a table for {} minor units of change",
            len.saturating_sub(1)
        ))
    })?;
    table.resize(len, fill);
    Ok(table)
}

/// Shared guards, then the pieces sorted highest value first.
fn ordered_denominations(
    change: Money,
    denominations: &[Denomination],
) -> CoreResult<Vec<&Denomination>> {
    if change.is_negative() {
        return Err(CoreError::invalid_input(format!(
            "change amount must not be negative, got {}",
            change.minor_units()
        )));
    }
    if denominations.is_empty() {
        return Err(CoreError::invalid_input("denomination list is empty"));
    }
    if let Some(d) = denominations.iter().find(|d| d.value <= 0) {
        return Err(CoreError::invalid_input(format!(
            "denomination '{}' has non-positive value {}",
            d.name, d.value
        )));
    }

    let mut ordered: Vec<&Denomination> = denominations.iter().collect();
    ordered.sort_by(|a, b| b.value.cmp(&a.value));
    Ok(ordered)
}

// =============================================================================
// Unit Tests
// =============================================================================
