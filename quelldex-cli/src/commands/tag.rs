use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn list(path: PathBuf) -> Result<()> {
    let repo = super::open_repo(&path)?;
    let tags = repo.tags()?;

    if tags.is_empty() {
        println!("{}", "No tags yet".yellow());
        return Ok(());
    }

    for tag in tags {
        print!(
            "{} {} {}",
            tag.name.bold(),
            tag.commit_id.yellow(),
            super::format_timestamp(tag.created_at).dimmed()
        );
        if !tag.description.is_empty() {
            print!("  {}", tag.description);
        }
        println!();
    }

    Ok(())
}

pub fn create(
    path: PathBuf,
    name: String,
    target: Option<String>,
    description: String,
) -> Result<()> {
    let mut repo = super::open_repo(&path)?;
    let commit_id = target
        .map(|target| super::resolve_commit(&repo, &target))
        .transpose()?;

    if repo.create_tag(&name, commit_id.as_deref(), &description)? {
        let tag = repo.get_tag(&name)?;
        println!("{} {}", "✓ Created tag".green().bold(), name.cyan());
        if let Some(tag) = tag {
            println!("  {}: {}", "Commit".bold(), tag.commit_id);
        }
    } else if repo.get_tag(&name)?.is_some() {
        println!("{} '{}' already exists", "Tag".yellow(), name);
    } else {
        println!("{}", "Nothing to tag: no commit given and no head".yellow());
    }

    Ok(())
}

pub fn goto(path: PathBuf, name: String, force: bool) -> Result<()> {
    let mut repo = super::open_repo(&path)?;

    if repo.get_tag(&name)?.is_none() {
        anyhow::bail!("Tag '{}' does not exist", name);
    }
    if !super::confirm_overwrite(&repo, force, "checking out the tag")? {
        println!("{}", "Cancelled".yellow());
        return Ok(());
    }

    let pb = super::spinner("Restoring files...");
    let result = repo.goto_tag(&name);
    pb.finish_and_clear();

    match result? {
        Some(report) => {
            println!("{} {}", "✓ Restored tag".green().bold(), name.cyan());
            println!(
                "  {} written, {} removed",
                report.written.to_string().green(),
                report.removed.to_string().red()
            );
            println!(
                "  {}: {}",
                "Branch".bold(),
                repo.current_branch().unwrap_or("(none)")
            );
            super::print_warnings(&report.warnings);
        }
        None => println!("{}", "Tagged snapshot is missing or corrupt".red()),
    }

    Ok(())
}
