use anyhow::{Context, Result};
use colored::Colorize;
use quelldex_core::Repository;
use std::path::PathBuf;

pub fn run(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let abs_path = std::fs::canonicalize(&path)?;
    let existed = Repository::is_initialized(&abs_path);

    let repo = Repository::init(&abs_path)?;

    if existed {
        println!("{}", "Repository already initialized".yellow());
    } else {
        println!("{}", "✓ Initialized quelldex repository".green().bold());
    }
    println!("  {}: {}", "Root".bold(), repo.root().display());
    println!(
        "  {}: {}",
        "Branch".bold(),
        repo.current_branch().unwrap_or("(none)").cyan()
    );
    println!(
        "  {}: {}",
        "Ignored".bold(),
        repo.config().ignore_dirs.join(", ").dimmed()
    );

    Ok(())
}
