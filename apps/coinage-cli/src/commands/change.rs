//! Change command - one transaction

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use coinage_core::{CalculateChangeRequest, ChangeEngine, ChangeResponse, DenominationCatalog};
use rust_decimal::Decimal;

use super::{make_rng, resolve_config};
use crate::config::Overrides;

pub fn run(
    config_path: Option<&Path>,
    overrides: Overrides,
    owed: &str,
    paid: &str,
    json: bool,
) -> Result<()> {
    let response = calculate(config_path, overrides, owed, paid)?;
    println!("{}", render(&response, json)?);
    Ok(())
}

fn calculate(
    config_path: Option<&Path>,
    overrides: Overrides,
    owed: &str,
    paid: &str,
) -> Result<ChangeResponse> {
    let config = resolve_config(config_path, overrides)?;

    let request = CalculateChangeRequest {
        amount_owed: parse_decimal("--owed", owed)?,
        amount_paid: parse_decimal("--paid", paid)?,
        locale: config.locale.clone(),
        divisor: config.divisor,
        mode: Some(config.mode),
    };

    let engine = ChangeEngine::new(DenominationCatalog::builtin(), config.engine_settings());
    let mut rng = make_rng(config.seed);
    Ok(engine.calculate_change(&request, &mut rng)?)
}

fn render(response: &ChangeResponse, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(response)?)
    } else {
        Ok(response.formatted_change.clone())
    }
}

fn parse_decimal(flag: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).with_context(|| format!("{} '{}' is not a number", flag, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_core::ModePolicy;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("--owed", " 2.12 ").unwrap(), Decimal::new(212, 2));
        let err = parse_decimal("--paid", "abc").unwrap_err();
        assert_eq!(err.to_string(), "--paid 'abc' is not a number");
    }

    #[test]
    fn test_calculate_with_config_file() {
        let config = config_file("mode = \"optimal\"\n");
        let response =
            calculate(Some(config.path()), Overrides::default(), "2.12", "3.00").unwrap();

        assert_eq!(response.change_cents, 88);
        assert!(!response.is_random);
        assert_eq!(render(&response, false).unwrap(), "3 quarters,1 dime,3 pennies");

        let json: serde_json::Value =
            serde_json::from_str(&render(&response, true).unwrap()).unwrap();
        assert_eq!(json["change_cents"], 88);
        assert_eq!(json["denominations"]["quarter"], 3);
    }

    #[test]
    fn test_flags_override_config_file() {
        let config = config_file("locale = \"en-US\"\nmode = \"random\"\n");
        let overrides = Overrides {
            locale: Some("fr-FR".to_string()),
            mode: Some(ModePolicy::Optimal),
            ..Overrides::default()
        };
        let response = calculate(Some(config.path()), overrides, "1.00", "2.00").unwrap();
        assert_eq!(response.locale, "fr-FR");
        assert_eq!(response.formatted_change, "1 euro");
    }

    #[test]
    fn test_run_reports_validation_failure() {
        let config = config_file("");
        let err = run(Some(config.path()), Overrides::default(), "5.00", "3.00", false)
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient payment"));

        assert!(run(Some(config.path()), Overrides::default(), "2.12", "3.00", true).is_ok());
    }
}
