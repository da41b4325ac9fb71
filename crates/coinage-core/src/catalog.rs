//! # Denomination Catalog
//!
//! Static, per-locale tables of the physical pieces a till can hand back.
//!
//! ## Catalog Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DenominationCatalog                                 │
//! │                                                                         │
//! │  "en-US" ($) ──► 10000 hundred dollar bill … 25 quarter, 10 dime,      │
//! │                  5 nickel, 1 penny                                      │
//! │                                                                         │
//! │  "fr-FR" (€) ──► 10000 hundred euro bill … 20, 10, 5, 2 cent coins,    │
//! │                  1 cent                                                 │
//! │                                                                         │
//! │  Invariants checked on registration:                                    │
//! │  • non-empty                                                            │
//! │  • strictly decreasing by value                                         │
//! │  • every value positive                                                 │
//! │  • last entry has value 1 (any amount is payable)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is built once and never mutated afterwards, so a shared
//! reference can be handed to any number of threads without locking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::DEFAULT_LOCALE;

// =============================================================================
// Denomination
// =============================================================================

/// One physical piece of currency (coin or bill).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Denomination {
    /// Face value in minor units.
    pub value: i64,

    /// Singular display name ("penny").
    pub name: String,

    /// Plural display name ("pennies").
    pub plural_name: String,
}

impl Denomination {
    pub fn new(value: i64, name: impl Into<String>, plural_name: impl Into<String>) -> Self {
        Denomination {
            value,
            name: name.into(),
            plural_name: plural_name.into(),
        }
    }

    /// Name to print for `count` pieces.
    #[inline]
    pub fn label(&self, count: u64) -> &str {
        if count == 1 {
            &self.name
        } else {
            &self.plural_name
        }
    }

    /// True for the indivisible unit piece.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.value == 1
    }
}

// =============================================================================
// Locale Definition
// =============================================================================

/// A currency system registered under a locale id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocaleDefinition {
    /// Locale id, e.g. "en-US".
    pub id: String,

    /// Currency symbol used when rendering amounts.
    pub currency_symbol: String,

    /// Fraction digits of the major unit (2 for dollars and euros).
    pub minor_digits: u32,

    /// Pieces ordered by strictly decreasing value.
    pub denominations: Vec<Denomination>,
}

impl LocaleDefinition {
    /// Builds a definition, sorting denominations highest value first.
    ///
    /// Sorting here means callers can list pieces in any order; the
    /// remaining invariants are checked by [`LocaleDefinition::validate`].
    pub fn new(
        id: impl Into<String>,
        currency_symbol: impl Into<String>,
        minor_digits: u32,
        mut denominations: Vec<Denomination>,
    ) -> Self {
        denominations.sort_by(|a, b| b.value.cmp(&a.value));
        LocaleDefinition {
            id: id.into(),
            currency_symbol: currency_symbol.into(),
            minor_digits,
            denominations,
        }
    }

    /// Checks the catalog invariants for this locale.
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: String| CoreError::InvalidCatalog { reason };

        if self.id.trim().is_empty() {
            return Err(invalid("locale id is empty".to_string()));
        }

        let Some(last) = self.denominations.last() else {
            return Err(invalid(format!("{} has no denominations", self.id)));
        };

        if let Some(d) = self.denominations.iter().find(|d| d.value <= 0) {
            return Err(invalid(format!(
                "{}: denomination '{}' has non-positive value {}",
                self.id, d.name, d.value
            )));
        }

        if let Some(pair) = self
            .denominations
            .windows(2)
            .find(|pair| pair[0].value <= pair[1].value)
        {
            return Err(invalid(format!(
                "{}: denominations must be strictly decreasing ('{}' = {} before '{}' = {})",
                self.id, pair[0].name, pair[0].value, pair[1].name, pair[1].value
            )));
        }

        if !last.is_unit() {
            return Err(invalid(format!(
                "{}: smallest denomination must have value 1, found {}",
                self.id, last.value
            )));
        }

        // Decompositions are keyed by singular name; a repeat would merge counts.
        let mut singular = BTreeSet::new();
        let mut plural = BTreeSet::new();
        for d in &self.denominations {
            if !singular.insert(d.name.as_str()) {
                return Err(invalid(format!(
                    "{}: duplicate denomination name '{}'",
                    self.id, d.name
                )));
            }
            if !plural.insert(d.plural_name.as_str()) {
                return Err(invalid(format!(
                    "{}: duplicate plural name '{}'",
                    self.id, d.plural_name
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Built-in Tables
// =============================================================================

/// US dollar pieces, values in cents.
fn en_us() -> LocaleDefinition {
    LocaleDefinition::new(
        "en-US",
        "$",
        2,
        vec![
            Denomination::new(10000, "hundred dollar bill", "hundred dollar bills"),
            Denomination::new(5000, "fifty dollar bill", "fifty dollar bills"),
            Denomination::new(2000, "twenty dollar bill", "twenty dollar bills"),
            Denomination::new(1000, "ten dollar bill", "ten dollar bills"),
            Denomination::new(500, "five dollar bill", "five dollar bills"),
            Denomination::new(100, "dollar", "dollars"),
            Denomination::new(25, "quarter", "quarters"),
            Denomination::new(10, "dime", "dimes"),
            Denomination::new(5, "nickel", "nickels"),
            Denomination::new(1, "penny", "pennies"),
        ],
    )
}

/// Euro pieces, values in cents.
fn fr_fr() -> LocaleDefinition {
    LocaleDefinition::new(
        "fr-FR",
        "€",
        2,
        vec![
            Denomination::new(10000, "hundred euro bill", "hundred euro bills"),
            Denomination::new(5000, "fifty euro bill", "fifty euro bills"),
            Denomination::new(2000, "twenty euro bill", "twenty euro bills"),
            Denomination::new(1000, "ten euro bill", "ten euro bills"),
            Denomination::new(500, "five euro bill", "five euro bills"),
            Denomination::new(200, "two euro coin", "two euro coins"),
            Denomination::new(100, "euro", "euros"),
            Denomination::new(20, "twenty cent coin", "twenty cent coins"),
            Denomination::new(10, "ten cent coin", "ten cent coins"),
            Denomination::new(5, "five cent coin", "five cent coins"),
            Denomination::new(2, "two cent coin", "two cent coins"),
            Denomination::new(1, "cent", "cents"),
        ],
    )
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-only registry of locale definitions.
#[derive(Debug, Clone, Default)]
pub struct DenominationCatalog {
    locales: BTreeMap<String, LocaleDefinition>,
}

static BUILTIN: OnceLock<DenominationCatalog> = OnceLock::new();

impl DenominationCatalog {
    /// An empty catalog; add locales with [`DenominationCatalog::with_locale`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// The process-wide catalog holding `en-US` and `fr-FR`.
    ///
    /// Initialized on first use and immutable afterwards.
    pub fn builtin() -> &'static DenominationCatalog {
        BUILTIN.get_or_init(|| DenominationCatalog {
            locales: [en_us(), fr_fr()]
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        })
    }

    /// Returns a copy of this catalog with `definition` registered.
    ///
    /// Rejects definitions that break the ordering or unit invariants.
    /// Registering an id twice replaces the earlier definition.
    pub fn with_locale(mut self, definition: LocaleDefinition) -> CoreResult<Self> {
        definition.validate()?;
        self.locales.insert(definition.id.clone(), definition);
        Ok(self)
    }

    /// Full definition for a locale.
    pub fn locale(&self, locale_id: &str) -> CoreResult<&LocaleDefinition> {
        self.locales
            .get(locale_id)
            .ok_or_else(|| CoreError::UnknownLocale {
                locale: locale_id.to_string(),
            })
    }

    /// Ordered denomination list for a locale, highest value first.
    pub fn lookup(&self, locale_id: &str) -> CoreResult<&[Denomination]> {
        self.locale(locale_id).map(|def| def.denominations.as_slice())
    }

    /// Registered locale ids in sorted order.
    pub fn locale_ids(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }

    /// Registered locales plus the default, as served to the front end.
    pub fn supported_locales(&self) -> SupportedLocales {
        SupportedLocales {
            locales: self.locales.keys().cloned().collect(),
            default: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Response shape for "which locales can I ask for?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupportedLocales {
    pub locales: Vec<String>,
    pub default: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
