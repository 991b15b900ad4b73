use anyhow::{Context, Result};
use bootcamp::geojson::to_feature_collection;
use bootcamp::BootcampService;
use std::fs;
use std::path::PathBuf;

pub async fn run(service: &BootcampService, output: Option<PathBuf>) -> Result<()> {
    let bootcamps = service.all().await.context("Failed to read bootcamps")?;
    let collection = to_feature_collection(&bootcamps);
    let skipped = bootcamps.len() - collection.features.len();
    let json = serde_json::to_string_pretty(&collection)?;

    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} bootcamps to {}",
                collection.features.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    if skipped > 0 {
        eprintln!("Skipped {} bootcamps without a location", skipped);
    }

    Ok(())
}
