//! # Change Formatting
//!
//! Renders a decomposition as the text a cashier reads out:
//!
//! ```text
//! { quarter: 3, dime: 1, penny: 3 }  ──►  "3 quarters,1 dime,3 pennies"
//! { }                                ──►  "No change due"
//! ```
//!
//! Entries always come out highest value first, whatever order the counts
//! were stored in.

use crate::catalog::Denomination;
use crate::types::ChangeDecomposition;
use crate::NO_CHANGE_TEXT;

/// Formats `decomposition` against a denomination table.
///
/// Count 1 uses the singular name, any other count the plural. Entries are
/// joined with a bare comma. Names in the decomposition that the table does
/// not know are skipped.
///
/// ```rust
/// use coinage_core::catalog::DenominationCatalog;
/// use coinage_core::format::format_change;
/// use coinage_core::types::ChangeDecomposition;
///
/// let usd = DenominationCatalog::builtin().lookup("en-US").unwrap();
/// let mut change = ChangeDecomposition::new();
/// change.add("penny", 3);
/// change.add("quarter", 3);
/// change.add("dime", 1);
/// assert_eq!(format_change(&change, usd), "3 quarters,1 dime,3 pennies");
/// ```
pub fn format_change(
    decomposition: &ChangeDecomposition,
    denominations: &[Denomination],
) -> String {
    let mut ordered: Vec<&Denomination> = denominations.iter().collect();
    ordered.sort_by(|a, b| b.value.cmp(&a.value));

    let parts: Vec<String> = ordered
        .into_iter()
        .filter_map(|d| {
            let count = decomposition.count(&d.name);
            (count > 0).then(|| format!("{} {}", count, d.label(count)))
        })
        .collect();

    if parts.is_empty() {
        NO_CHANGE_TEXT.to_string()
    } else {
        parts.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DenominationCatalog;

    fn usd() -> &'static [Denomination] {
        DenominationCatalog::builtin().lookup("en-US").unwrap()
    }

    #[test]
    fn test_format_scenario_a() {
        let change: ChangeDecomposition = [("quarter", 3), ("dime", 1), ("penny", 3)]
            .into_iter()
            .map(|(n, c)| (n.to_string(), c))
            .collect();
        assert_eq!(format_change(&change, usd()), "3 quarters,1 dime,3 pennies");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_change(&ChangeDecomposition::new(), usd()), "No change due");
    }

    #[test]
    fn test_format_singular_and_plural() {
        let mut change = ChangeDecomposition::new();
        change.add("penny", 1);
        change.add("dollar", 2);
        change.add("hundred dollar bill", 1);
        assert_eq!(
            format_change(&change, usd()),
            "1 hundred dollar bill,2 dollars,1 penny"
        );
    }

    #[test]
    fn test_format_order_ignores_insertion_order() {
        let mut forward = ChangeDecomposition::new();
        forward.add("nickel", 1);
        forward.add("quarter", 2);

        let mut backward = ChangeDecomposition::new();
        backward.add("quarter", 2);
        backward.add("nickel", 1);

        assert_eq!(format_change(&forward, usd()), "2 quarters,1 nickel");
        assert_eq!(format_change(&forward, usd()), format_change(&backward, usd()));
    }

    #[test]
    fn test_format_euro() {
        let eur = DenominationCatalog::builtin().lookup("fr-FR").unwrap();
        let mut change = ChangeDecomposition::new();
        change.add("euro", 1);
        change.add("two cent coin", 2);
        change.add("cent", 1);
        assert_eq!(format_change(&change, eur), "1 euro,2 two cent coins,1 cent");
    }
}
