use anyhow::{Context, Result};
use bootcamp::{BootcampService, ListQuery};
use serde_json::{json, Value};

pub async fn run(service: &BootcampService, query: &str, json: bool) -> Result<()> {
    let query = ListQuery::parse(query);
    let page = service.list(&query).await.context("Listing failed")?;

    if json {
        let output = json!({
            "count": page.data.len(),
            "total": page.total,
            "pagination": page.pagination,
            "data": page.data,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if page.data.is_empty() {
        println!("No bootcamps found");
        return Ok(());
    }

    print_table(&page.data);

    println!();
    println!(
        "Page {} ({} of {} matching)",
        query.page.page,
        page.data.len(),
        page.total
    );
    if let Some(next) = page.pagination.next {
        println!("Next: page={}&limit={}", next.page, next.limit);
    }

    Ok(())
}

/// Print documents as a fixed-width table. Fields removed by a projection
/// show as `-`.
pub fn print_table(documents: &[Value]) {
    println!(
        "{:<30} {:<16} {:>10} {:>7}  {}",
        "NAME", "CITY", "COST", "RATING", "CAREERS"
    );
    println!("{}", "-".repeat(80));

    for doc in documents {
        println!("{}", format_row(doc));
    }
}

fn format_row(doc: &Value) -> String {
    let text = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "-".to_string())
    };
    let number = |v: Option<&Value>, decimals: usize| {
        v.and_then(Value::as_f64)
            .map(|n| format!("{:.*}", decimals, n))
            .unwrap_or_else(|| "-".to_string())
    };
    let careers = doc
        .get("careers")
        .and_then(Value::as_array)
        .map(|c| {
            c.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<30} {:<16} {:>10} {:>7}  {}",
        truncate(&text(doc.get("name")), 30),
        truncate(&text(doc.pointer("/location/city")), 16),
        number(doc.get("averageCost"), 0),
        number(doc.get("averageRating"), 1),
        careers
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
