use anyhow::Result;
use colored::Colorize;
use quelldex_core::MergeOutcome;
use std::path::PathBuf;

pub fn run(path: PathBuf, source: String, message: Option<String>, force: bool) -> Result<()> {
    let mut repo = super::open_repo(&path)?;

    if !super::confirm_overwrite(&repo, force, "the merge")? {
        println!("{}", "Merge cancelled".yellow());
        return Ok(());
    }

    let pb = super::spinner("Merging...");
    let result = repo.merge_branch(&source, message.as_deref());
    pb.finish_and_clear();

    let report = match result? {
        MergeOutcome::Merged(report) => report,
        MergeOutcome::Refused(reason) => {
            println!("{} {}", "Merge refused:".red().bold(), reason);
            return Ok(());
        }
    };

    println!(
        "{} {} into {}",
        "✓ Merged".green().bold(),
        source.cyan(),
        repo.current_branch().unwrap_or_default().cyan()
    );
    match &report.commit_id {
        Some(id) => println!("  {}: {}", "Commit ID".bold(), id.yellow()),
        None => println!("  {}", "Merged tree is empty, nothing committed".dimmed()),
    }
    println!("  {}: {}", "Files".bold(), report.files_merged);

    if !report.conflicts.is_empty() {
        println!();
        println!(
            "{} {}",
            "Conflicts resolved in favour of".yellow().bold(),
            source.cyan()
        );
        for path in &report.conflicts {
            println!("  {} {}", "!".yellow(), path);
        }
    }

    super::print_warnings(&report.warnings);

    Ok(())
}
