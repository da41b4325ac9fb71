//! Locales command - list supported locales

use anyhow::Result;
use coinage_core::DenominationCatalog;

pub fn run(json: bool) -> Result<()> {
    println!("{}", render(DenominationCatalog::builtin(), json)?);
    Ok(())
}

fn render(catalog: &DenominationCatalog, json: bool) -> Result<String> {
    let supported = catalog.supported_locales();

    if json {
        return Ok(serde_json::to_string_pretty(&supported)?);
    }

    let mut lines = Vec::with_capacity(supported.locales.len());
    for id in &supported.locales {
        let marker = if *id == supported.default { " (default)" } else { "" };
        let pieces = catalog.lookup(id)?.len();
        lines.push(format!("{}{}  {} denominations", id, marker, pieces));
    }
    Ok(lines.join("\n"))
}
