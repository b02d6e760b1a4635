use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: PathBuf, target: String, execute: bool, force: bool) -> Result<()> {
    let mut repo = super::open_repo(&path)?;
    let commit_id = super::resolve_commit(&repo, &target)?;
    let Some(commit) = repo.get_commit(&commit_id)? else {
        anyhow::bail!("Commit {} not found", commit_id);
    };

    println!("{}", "Restore Preview".bold().cyan());
    println!("  {}: {}", "Target Commit".bold(), commit.id);
    println!("  {}: {}", "Branch".bold(), commit.branch);
    println!("  {}: {}", "Message".bold(), commit.message);
    println!("  {}: {}", "Author".bold(), commit.author);
    println!(
        "  {}: {}",
        "Date".bold(),
        super::format_timestamp(commit.timestamp)
    );
    println!();

    let Some(snapshot) = repo.get_commit_snapshot(&commit.id)? else {
        anyhow::bail!("Snapshot of commit {} is missing or corrupt", commit.id);
    };

    let scanned = repo.scanner().fast_index();
    let tracked = &scanned.value;

    println!("{}", "Files:".bold());
    for (rel, entry) in snapshot.iter() {
        let status = match tracked.get(rel) {
            None => "will be recreated".green(),
            Some(stat) if stat.matches(entry) => "unchanged".dimmed(),
            Some(_) => "will be restored".yellow(),
        };
        println!("  {} {}", rel, status);
    }
    for rel in tracked.keys().filter(|rel| !snapshot.contains(rel)) {
        println!("  {} {}", rel, "will be removed".red());
    }
    println!();

    if !execute {
        println!("{}", "This is a preview only.".yellow());
        println!(
            "Run with {} to actually perform the restore",
            "--execute".cyan()
        );
        return Ok(());
    }

    if !super::confirm_overwrite(&repo, force, "the restore")? {
        println!("{}", "Restore cancelled".yellow());
        return Ok(());
    }

    let pb = super::spinner("Restoring files...");
    let result = repo.restore_commit(&commit.id);
    pb.finish_and_clear();

    let Some(report) = result? else {
        anyhow::bail!("Snapshot of commit {} is missing or corrupt", commit.id);
    };

    if report.is_complete() {
        println!(
            "{}",
            format!(
                "✓ Restored {} file(s), removed {}",
                report.written, report.removed
            )
            .green()
            .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "⚠ Restored {}/{} files",
                report.written,
                snapshot.len()
            )
            .yellow()
            .bold()
        );
    }
    super::print_warnings(&report.warnings);

    Ok(())
}
