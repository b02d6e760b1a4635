use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: PathBuf, message: String, author: Option<String>) -> Result<()> {
    let mut repo = super::open_repo(&path)?;
    let author = author.unwrap_or_else(|| repo.config().default_author.clone());

    let pb = super::spinner("Snapshotting working tree...");
    let result = repo.commit(&message, &author);
    pb.finish_and_clear();

    let Some(id) = result? else {
        println!("{}", "Nothing to commit".yellow());
        return Ok(());
    };

    let files = repo
        .get_commit_snapshot(&id)?
        .map(|snapshot| snapshot.len())
        .unwrap_or_default();

    println!("{}", "✓ Commit created successfully!".green().bold());
    println!("  {}: {}", "Commit ID".bold(), id.yellow());
    println!(
        "  {}: {}",
        "Branch".bold(),
        repo.current_branch().unwrap_or_default()
    );
    println!("  {}: {}", "Message".bold(), message);
    println!("  {}: {}", "Author".bold(), author);
    println!("  {}: {}", "Files tracked".bold(), files);

    Ok(())
}
