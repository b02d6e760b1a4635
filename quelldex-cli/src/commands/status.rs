use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: PathBuf) -> Result<()> {
    let repo = super::open_repo(&path)?;

    println!("{}", "Repository Status".bold().cyan());
    println!("  {}: {}", "Root".bold(), repo.root().display());
    println!(
        "  {}: {}",
        "Branch".bold(),
        repo.current_branch().unwrap_or("(none)")
    );
    match repo.head()? {
        Some(head) => {
            if let Some(commit) = repo.get_commit(&head)? {
                println!(
                    "  {}: {} {}",
                    "Head".bold(),
                    commit.short_id().yellow(),
                    commit.message
                );
            }
        }
        None => println!("  {}: {}", "Head".bold(), "no commits yet".dimmed()),
    }
    println!();

    let scanned = repo.working_changes()?;
    let changes = &scanned.value;

    if changes.is_clean() {
        println!("{}", "Working tree clean".green());
    } else {
        println!(
            "{} {}",
            "Uncommitted changes:".bold(),
            format!("({})", changes.len()).yellow()
        );
        println!();

        let listed = changes
            .added
            .keys()
            .map(|p| ("+".green(), p))
            .chain(changes.modified.keys().map(|p| ("~".yellow(), p)))
            .chain(changes.removed.keys().map(|p| ("-".red(), p)));
        for (icon, path) in listed.take(10) {
            println!("  {} {}", icon, path);
        }

        if changes.len() > 10 {
            println!();
            println!(
                "  {} and {} more...",
                "...".dimmed(),
                (changes.len() - 10).to_string().yellow()
            );
        }

        println!();
        println!(
            "Run {} to commit these changes",
            "quelldex commit \"message\"".cyan()
        );
    }

    super::print_warnings(&scanned.warnings);

    Ok(())
}
