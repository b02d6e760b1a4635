use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: PathBuf, from: String, to: String, content: bool, json: bool) -> Result<()> {
    let repo = super::open_repo(&path)?;
    let from_id = super::resolve_commit(&repo, &from)?;
    let to_id = super::resolve_commit(&repo, &to)?;

    let diff = repo.diff_commits(&from_id, &to_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Diff {} → {}", from, to).bold().cyan()
    );
    println!();

    if diff.is_empty() {
        println!("{}", "No differences".green());
        return Ok(());
    }

    for path in diff.added.keys() {
        println!("{} {}", "NEW".green(), path.white().bold());
    }
    for path in diff.removed.keys() {
        println!("{} {}", "DEL".red(), path.white().bold());
    }
    for (path, change) in &diff.modified {
        println!("{} {}", "MOD".yellow(), path.white().bold());

        if !content {
            continue;
        }

        println!("{}", "━".repeat(80).bright_black());
        for line in repo.diff_file_content(&change.old.hash, &change.new.hash)? {
            let colored = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with("@@") {
                line.cyan()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else {
                line.normal()
            };
            println!("{}", colored);
        }
        println!();
    }

    println!();
    println!(
        "{} added, {} removed, {} modified",
        diff.added.len().to_string().green(),
        diff.removed.len().to_string().red(),
        diff.modified.len().to_string().yellow()
    );

    Ok(())
}
