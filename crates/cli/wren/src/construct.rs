//! Construct command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Map, Value as Json, json};
use std::fs;
use std::path::Path;
use wr_driver::{Config, Driver, SchemaCatalog};
use wr_record::RecordProxy;

pub fn run_construct(
    config: Config,
    schema: &Path,
    kind: &str,
    args: &str,
    calls: &[String],
    format: &str,
) -> Result<()> {
    let text = fs::read_to_string(schema)
        .with_context(|| format!("failed to read {}", schema.display()))?;
    let catalog = SchemaCatalog::from_json(&text)?;

    let arguments: Map<String, Json> =
        serde_json::from_str(args).context("arguments must be a JSON object")?;

    let driver = Driver::new(config);
    let proxy = RecordProxy::new(driver.construct(&catalog, kind, &arguments)?);

    let mut results = Vec::with_capacity(calls.len());
    for method in calls {
        let value = proxy.invoke(method, &[])?;
        results.push((method.as_str(), value.to_string()));
    }

    match format {
        "json" => {
            let calls: Map<String, Json> = results
                .iter()
                .map(|(method, value)| ((*method).to_owned(), Json::String(value.clone())))
                .collect();
            let output = json!({
                "record": proxy.instance().render(),
                "hash": proxy.instance().hash_code(),
                "calls": calls,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "text" => {
            println!("{} {}", "Constructed:".green().bold(), proxy.instance());
            for (method, value) in &results {
                println!("  {} {}", format!("{method}:").bold(), value);
            }
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }

    Ok(())
}
