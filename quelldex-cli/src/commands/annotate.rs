use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn add(
    path: PathBuf,
    target: String,
    file_path: String,
    content: String,
    line: Option<u32>,
) -> Result<()> {
    let mut repo = super::open_repo(&path)?;
    let commit_id = super::resolve_commit(&repo, &target)?;

    let id = repo.add_annotation(&commit_id, &file_path, &content, line)?;

    println!("{} #{}", "✓ Added annotation".green().bold(), id);
    match line {
        Some(line) => println!("  {}: {}:{}", "On".bold(), file_path, line),
        None => println!("  {}: {}", "On".bold(), file_path),
    }
    println!("  {}: {}", "Commit".bold(), commit_id);

    Ok(())
}

pub fn list(path: PathBuf, commit: Option<String>, file_path: Option<String>) -> Result<()> {
    let repo = super::open_repo(&path)?;
    let commit_id = commit
        .map(|target| super::resolve_commit(&repo, &target))
        .transpose()?;

    let annotations = repo.annotations(commit_id.as_deref(), file_path.as_deref())?;

    if annotations.is_empty() {
        println!("{}", "No annotations".yellow());
        return Ok(());
    }

    for note in annotations {
        let location = match note.line_number {
            Some(line) => format!("{}:{}", note.file_path, line),
            None => note.file_path.clone(),
        };
        println!(
            "{} {} {} {}",
            format!("#{}", note.id).dimmed(),
            location.bold(),
            note.commit_id.yellow(),
            super::format_timestamp(note.created_at).dimmed()
        );
        println!("    {}", note.content);
    }

    Ok(())
}
