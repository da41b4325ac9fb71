//! Batch command - process a file of transactions

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use coinage_core::{BatchProcessor, BatchReport, ChangeEngine, DenominationCatalog};

use super::{make_rng, resolve_config};
use crate::config::Overrides;

pub fn run(
    config_path: Option<&Path>,
    overrides: Overrides,
    file: &Path,
    detailed: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(config_path, overrides)?;
    let input = read_input(file)?;

    let engine = ChangeEngine::new(DenominationCatalog::builtin(), config.engine_settings());
    let processor = BatchProcessor::new(engine, config.locale.clone(), config.divisor, config.mode);
    let mut rng = make_rng(config.seed);
    let report = processor.process(&input, &mut rng);

    let rendered = render(&report, detailed)?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

/// `-` reads stdin.
fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read batch from stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Report text with a trailing newline (none for an empty simple report).
fn render(report: &BatchReport, detailed: bool) -> Result<String> {
    if detailed {
        let mut json = serde_json::to_string_pretty(&report.detailed())?;
        json.push('\n');
        return Ok(json);
    }

    let mut text = report.simple_text();
    if !text.is_empty() {
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_core::ModePolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn report(input: &str) -> BatchReport {
        BatchProcessor::new(ChangeEngine::builtin(), "en-US", 3, ModePolicy::Optimal)
            .process(input, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_render_simple() {
        let text = render(&report("2.12,3.00\n1.50,1.50\n"), false).unwrap();
        assert_eq!(text, "3 quarters,1 dime,3 pennies\nNo change due\n");
        assert_eq!(render(&report(""), false).unwrap(), "");
    }

    #[test]
    fn test_render_detailed() {
        let text = render(&report("2.12,3.00\nbad,line\n"), true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["total_lines"], 2);
        assert_eq!(json["error_lines"], 1);
        assert_eq!(json["records"][1]["line_number"], 2);
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "2.12,3.00\r\n").unwrap();
        assert_eq!(read_input(file.path()).unwrap(), "2.12,3.00\r\n");
        assert!(read_input(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        let config = dir.path().join("coinage.toml");
        std::fs::write(&input, "2.12,3.00\n5.00,3.00\n").unwrap();
        std::fs::write(&config, "mode = \"optimal\"\n").unwrap();

        run(Some(&config), Overrides::default(), &input, false, Some(&output)).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            concat!(
                "3 quarters,1 dime,3 pennies\n",
                "Line 2: Insufficient payment: paid 3.00 is less than owed 5.00\n",
            )
        );
    }
}
