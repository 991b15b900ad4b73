use anyhow::{Context, Result};
use bootcamp::BootcampService;
use serde_json::{json, Value};

use super::list::print_table;

pub async fn run(service: &BootcampService, zipcode: &str, distance: f64, json: bool) -> Result<()> {
    let bootcamps = service
        .within_radius(zipcode, distance)
        .await
        .with_context(|| format!("Radius search around {} failed", zipcode))?;

    let documents = bootcamps
        .iter()
        .map(|b| b.to_document())
        .collect::<Result<Vec<Value>, _>>()?;

    if json {
        let output = json!({
            "zipcode": zipcode,
            "distance": distance,
            "count": documents.len(),
            "data": documents,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if documents.is_empty() {
        println!("No bootcamps within {} miles of {}", distance, zipcode);
        return Ok(());
    }

    print_table(&documents);
    println!();
    println!(
        "{} bootcamps within {} miles of {}",
        documents.len(),
        distance,
        zipcode
    );

    Ok(())
}
