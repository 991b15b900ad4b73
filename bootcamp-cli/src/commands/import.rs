use anyhow::{bail, Context, Result};
use bootcamp::BootcampService;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub async fn run(service: &BootcampService, input: PathBuf) -> Result<()> {
    let payloads = read_payloads(&input)?;
    let count = payloads.len();

    let inserted = service
        .import(payloads)
        .await
        .with_context(|| format!("Failed to import {}", input.display()))?;

    println!("Data imported: {} of {} bootcamps", inserted, count);
    Ok(())
}

/// Read a JSON array of bootcamps. A single object is accepted as a
/// one-element batch.
fn read_payloads(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }

    let contents = fs::read_to_string(path).context("Failed to read input file")?;
    let value: Value = serde_json::from_str(&contents).context("Input file is not valid JSON")?;

    match value {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        other => bail!(
            "Expected an array of bootcamps, found {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                _ => "a string",
            }
        ),
    }
}
