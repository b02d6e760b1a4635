use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn list(path: PathBuf) -> Result<()> {
    let repo = super::open_repo(&path)?;
    let current = repo.current_branch();

    for branch in repo.branches()? {
        let marker = if Some(branch.name.as_str()) == current {
            "*".green().bold()
        } else {
            " ".normal()
        };
        let head = match &branch.head_commit {
            Some(id) => id.yellow(),
            None => "(empty)".dimmed(),
        };
        print!("{} {} {}", marker, branch.name.bold(), head);
        if !branch.description.is_empty() {
            print!("  {}", branch.description.dimmed());
        }
        println!();
    }

    Ok(())
}

pub fn create(path: PathBuf, name: String, description: String) -> Result<()> {
    let mut repo = super::open_repo(&path)?;

    if repo.create_branch(&name, &description)? {
        println!("{} {}", "✓ Created branch".green().bold(), name.cyan());
        match repo.branch_head(&name)? {
            Some(head) => println!("  {}: {}", "At".bold(), head),
            None => println!("  {}", "No commits yet".dimmed()),
        }
    } else {
        println!("{} '{}' already exists", "Branch".yellow(), name);
    }

    Ok(())
}

pub fn delete(path: PathBuf, name: String) -> Result<()> {
    let mut repo = super::open_repo(&path)?;

    if repo.delete_branch(&name)? {
        println!("{} {}", "✓ Deleted branch".green().bold(), name);
    } else if repo.current_branch() == Some(name.as_str()) {
        println!("{}", "Cannot delete the current branch".red());
    } else {
        println!("{} '{}' does not exist", "Branch".yellow(), name);
    }

    Ok(())
}
