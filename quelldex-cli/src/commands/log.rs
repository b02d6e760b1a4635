use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(
    path: PathBuf,
    branch: Option<String>,
    all: bool,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let repo = super::open_repo(&path)?;
    let limit = limit.unwrap_or(repo.config().history_limit);

    let branch = if all {
        None
    } else {
        branch.or_else(|| repo.current_branch().map(str::to_string))
    };
    let commits = repo.history(branch.as_deref(), limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&commits)?);
        return Ok(());
    }

    if commits.is_empty() {
        println!("{}", "No commits yet".yellow());
        return Ok(());
    }

    let title = match &branch {
        Some(name) => format!("Commit History ({})", name),
        None => "Commit History (all branches)".to_string(),
    };
    println!("{}", title.bold().cyan());
    println!();

    for commit in &commits {
        println!("{} {}", "commit".yellow().bold(), commit.id.yellow());
        if branch.is_none() {
            println!("{}: {}", "Branch".bold(), commit.branch);
        }
        if let Some(parent) = &commit.parent_id {
            println!("{}: {}", "Parent".bold(), parent.dimmed());
        }
        println!("{}: {}", "Author".bold(), commit.author);
        println!(
            "{}: {}",
            "Date".bold(),
            super::format_timestamp(commit.timestamp)
        );
        println!();
        println!("    {}", commit.message);
        println!();
    }

    if commits.len() == limit {
        println!("Use {} to see more", "--limit N".cyan());
    }

    Ok(())
}
