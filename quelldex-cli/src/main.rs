use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{annotate, branch, commit, diff, init, log, merge, restore, stats, status, switch, tag};

#[derive(Parser)]
#[command(name = "quelldex")]
#[command(version, about = "Lightweight version control for project trees", long_about = None)]
struct Cli {
    /// Repository root (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository in the given directory
    Init,

    /// Show the current branch and uncommitted changes
    Status,

    /// Record the working tree on the current branch
    Commit {
        /// Commit message
        message: String,

        /// Author (defaults to the configured author)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show commit history
    Log {
        /// Branch to show (defaults to the current branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// Show commits from every branch
        #[arg(long, conflicts_with = "branch")]
        all: bool,

        /// Number of commits to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List, create or delete branches
    Branch {
        #[command(subcommand)]
        action: Option<BranchAction>,
    },

    /// Switch to another branch, restoring its files
    Switch {
        name: String,

        /// Overwrite uncommitted changes without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Merge another branch into the current one
    Merge {
        source: String,

        /// Merge commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Overwrite uncommitted changes without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Show differences between two commits, tags or branches
    Diff {
        from: String,
        to: String,

        /// Include line-level diffs of modified files
        #[arg(short, long)]
        content: bool,

        /// Print as JSON
        #[arg(long, conflicts_with = "content")]
        json: bool,
    },

    /// Restore the working tree to a commit without switching branches
    Restore {
        /// Commit, tag or branch to restore
        target: String,

        /// Actually perform the restore (without this, just shows preview)
        #[arg(long)]
        execute: bool,

        /// Overwrite uncommitted changes without asking
        #[arg(short, long)]
        force: bool,
    },

    /// List, create or check out tags
    Tag {
        #[command(subcommand)]
        action: Option<TagAction>,
    },

    /// Attach a note to a file in a commit
    Annotate {
        /// Commit, tag or branch the note belongs to
        target: String,
        path: String,
        content: String,

        /// Line the note refers to
        #[arg(short, long)]
        line: Option<u32>,
    },

    /// List notes, optionally filtered
    Annotations {
        /// Only notes on this commit, tag or branch
        #[arg(short, long)]
        commit: Option<String>,

        /// Only notes on this path
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Show repository statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BranchAction {
    /// List branches
    List,

    /// Create a branch at the current head
    Create {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a branch pointer (commits stay in history)
    Delete { name: String },
}

#[derive(Subcommand)]
enum TagAction {
    /// List tags
    List,

    /// Tag a commit (defaults to the current head)
    Create {
        name: String,

        /// Commit, tag or branch to tag
        #[arg(short, long)]
        target: Option<String>,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Restore the tagged snapshot without switching branches
    Goto {
        name: String,

        /// Overwrite uncommitted changes without asking
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let repo = cli.repo;

    match cli.command {
        Commands::Init => init::run(repo)?,
        Commands::Status => status::run(repo)?,
        Commands::Commit { message, author } => commit::run(repo, message, author)?,
        Commands::Log {
            branch,
            all,
            limit,
            json,
        } => log::run(repo, branch, all, limit, json)?,
        Commands::Branch { action } => match action.unwrap_or(BranchAction::List) {
            BranchAction::List => branch::list(repo)?,
            BranchAction::Create { name, description } => {
                branch::create(repo, name, description)?
            }
            BranchAction::Delete { name } => branch::delete(repo, name)?,
        },
        Commands::Switch { name, force } => switch::run(repo, name, force)?,
        Commands::Merge {
            source,
            message,
            force,
        } => merge::run(repo, source, message, force)?,
        Commands::Diff {
            from,
            to,
            content,
            json,
        } => diff::run(repo, from, to, content, json)?,
        Commands::Restore {
            target,
            execute,
            force,
        } => restore::run(repo, target, execute, force)?,
        Commands::Tag { action } => match action.unwrap_or(TagAction::List) {
            TagAction::List => tag::list(repo)?,
            TagAction::Create {
                name,
                target,
                description,
            } => tag::create(repo, name, target, description)?,
            TagAction::Goto { name, force } => tag::goto(repo, name, force)?,
        },
        Commands::Annotate {
            target,
            path,
            content,
            line,
        } => annotate::add(repo, target, path, content, line)?,
        Commands::Annotations { commit, path } => annotate::list(repo, commit, path)?,
        Commands::Stats { json } => stats::run(repo, json)?,
    }

    Ok(())
}
