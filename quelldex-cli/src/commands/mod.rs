pub mod annotate;
pub mod branch;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod restore;
pub mod stats;
pub mod status;
pub mod switch;
pub mod tag;

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use quelldex_core::{ChangeDetection, Repository, Warning};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub fn open_repo(path: &Path) -> Result<Repository> {
    if !Repository::is_initialized(path) {
        bail!(
            "No quelldex repository found at {}. Run 'quelldex init' first.",
            path.display()
        );
    }

    debug!("Opening repository at {:?}", path);
    Ok(Repository::open(path)?)
}

/// Resolves a tag name, branch name or commit id to a commit id.
pub fn resolve_commit(repo: &Repository, target: &str) -> Result<String> {
    if let Some(tag) = repo.get_tag(target)? {
        return Ok(tag.commit_id);
    }
    if let Some(branch) = repo.get_branch(target)? {
        match branch.head_commit {
            Some(head) => return Ok(head),
            None => bail!("Branch '{}' has no commits", target),
        }
    }
    if repo.get_commit(target)?.is_some() {
        return Ok(target.to_string());
    }

    bail!("Unknown commit, tag or branch: {}", target)
}

/// Asks before an operation overwrites uncommitted work.
///
/// Content is re-hashed here, so files that were only touched (e.g. by a
/// previous restore) do not trigger the prompt.
pub fn confirm_overwrite(repo: &Repository, force: bool, action: &str) -> Result<bool> {
    if force {
        return Ok(true);
    }

    let changes = repo
        .working_changes_with(ChangeDetection::Verify)?
        .into_value();
    if changes.is_clean() {
        return Ok(true);
    }

    println!(
        "{} {} uncommitted change(s) will be overwritten by {}:",
        "⚠".yellow().bold(),
        changes.len().to_string().yellow(),
        action
    );
    let paths = changes
        .added
        .keys()
        .chain(changes.modified.keys())
        .chain(changes.removed.keys());
    for path in paths.take(10) {
        println!("  {}", path.dimmed());
    }
    if changes.len() > 10 {
        println!("  {} and {} more...", "...".dimmed(), changes.len() - 10);
    }
    println!();

    let proceed = Confirm::new()
        .with_prompt("Continue anyway?")
        .default(false)
        .interact()?;

    Ok(proceed)
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }

    println!();
    println!("{}", "Warnings:".yellow().bold());
    for warning in warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }
}

pub fn format_timestamp(timestamp: f64) -> String {
    quelldex_core::models::to_datetime(timestamp)
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
