use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: PathBuf, json: bool) -> Result<()> {
    let repo = super::open_repo(&path)?;

    let pb = super::spinner("Measuring object store...");
    let stats = repo.stats();
    pb.finish_and_clear();
    let stats = stats?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Repository Statistics".bold().cyan());
    println!("  {}: {}", "Commits".bold(), stats.commits);
    println!("  {}: {}", "Branches".bold(), stats.branches);
    println!("  {}: {}", "Tags".bold(), stats.tags);
    println!("  {}: {}", "Annotations".bold(), stats.annotations);
    println!("  {}: {}", "Objects".bold(), stats.objects);
    println!(
        "  {}: {}",
        "Storage".bold(),
        format_bytes(stats.storage_bytes)
    );

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
