use anyhow::{Context, Result};
use bootcamp::BootcampService;

pub async fn run(service: &BootcampService) -> Result<()> {
    let removed = service
        .destroy()
        .await
        .context("Failed to delete bootcamps")?;

    println!("Data destroyed: {} bootcamps removed", removed);
    Ok(())
}
