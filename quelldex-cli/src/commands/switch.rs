use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: PathBuf, name: String, force: bool) -> Result<()> {
    let mut repo = super::open_repo(&path)?;

    if repo.get_branch(&name)?.is_none() {
        anyhow::bail!("Branch '{}' does not exist", name);
    }
    if repo.current_branch() == Some(name.as_str()) {
        println!("Already on {}", name.cyan());
        return Ok(());
    }
    if !super::confirm_overwrite(&repo, force, "the switch")? {
        println!("{}", "Switch cancelled".yellow());
        return Ok(());
    }

    let pb = super::spinner("Restoring files...");
    let result = repo.switch_branch(&name);
    pb.finish_and_clear();

    match result? {
        Some(report) => {
            println!("{} {}", "✓ Switched to".green().bold(), name.cyan());
            println!(
                "  {} written, {} removed",
                report.written.to_string().green(),
                report.removed.to_string().red()
            );
            super::print_warnings(&report.warnings);
        }
        None => println!("{} '{}' does not exist", "Branch".yellow(), name),
    }

    Ok(())
}
