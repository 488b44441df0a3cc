use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::branch::{branch_conversation, copy_conversation};
use crate::indexer::scan;
use crate::models::{Catalog, ConversationRecord, Scope};
use crate::tree::{self, Link, RootReason};
use crate::utils::terminal::preview_line;
use crate::utils::{current_project_path, format_path_with_tilde, resolve_storage_root};

const TITLE_WIDTH: usize = 60;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Parser)]
#[command(name = "claude-bushwack")]
#[command(version)]
#[command(about = "Browse and branch Claude Code conversations", long_about = None)]
pub struct Cli {
    /// Directory holding one subdirectory per project [default: ~/.claude/projects]
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_root: Option<PathBuf>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conversations, newest first
    List(ScopeArgs),
    /// Show conversations as branch trees
    Tree(ScopeArgs),
    /// Create a branch of a conversation
    Branch {
        /// Conversation ID or unique prefix
        id: String,
        /// Project to place the branch in [default: the source's project]
        #[arg(long, value_name = "PATH")]
        project: Option<PathBuf>,
    },
    /// Copy a conversation into another project without linking it to the source
    Copy {
        /// Conversation ID or unique prefix
        id: String,
        /// Destination project
        #[arg(long, value_name = "PATH")]
        project: PathBuf,
    },
    /// Show the chain of parents of a conversation
    Ancestry {
        /// Conversation ID or unique prefix
        id: String,
    },
    /// Show statistics about the store
    Stats,
}

#[derive(Args)]
pub struct ScopeArgs {
    /// Include every project
    #[arg(long, conflicts_with = "project")]
    pub all: bool,

    /// Only this project [default: current directory]
    #[arg(long, value_name = "PATH")]
    pub project: Option<PathBuf>,
}

impl ScopeArgs {
    fn scope(&self) -> Result<Scope> {
        if self.all {
            return Ok(Scope::AllProjects);
        }
        let project = match &self.project {
            Some(path) => absolute_path(path)?,
            None => current_project_path()?,
        };
        Ok(Scope::CurrentProject(project))
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    super::init_tracing(cli.verbose);

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let storage_root = resolve_storage_root(cli.storage_root.as_deref())?;

    match command {
        Commands::List(args) => list(&storage_root, &args.scope()?),
        Commands::Tree(args) => show_tree(&storage_root, &args.scope()?),
        Commands::Branch { id, project } => {
            let target = project.as_deref().map(absolute_path).transpose()?;
            branch(&storage_root, id, target.as_deref())
        }
        Commands::Copy { id, project } => copy(&storage_root, id, &absolute_path(project)?),
        Commands::Ancestry { id } => ancestry(&storage_root, id),
        Commands::Stats => show_stats(&storage_root),
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Failed to resolve path {}", path.display()))
}

fn scan_catalog(storage_root: &Path, scope: &Scope) -> Result<Catalog> {
    scan(storage_root, scope).with_context(|| format!("Failed to scan {}", storage_root.display()))
}

fn summary_line(record: &ConversationRecord) -> String {
    format!(
        "{}  {}  {}",
        record.short_id(),
        record.last_modified_at.format(TIMESTAMP_FORMAT),
        preview_line(record.title(), TITLE_WIDTH)
    )
}

fn list(storage_root: &Path, scope: &Scope) -> Result<()> {
    let catalog = scan_catalog(storage_root, scope)?;
    if catalog.is_empty() {
        println!("No conversations found");
        return Ok(());
    }

    for record in catalog.conversations_newest_first() {
        println!("{}  {}", summary_line(record), format_path_with_tilde(&record.project_path));
    }
    Ok(())
}

fn show_tree(storage_root: &Path, scope: &Scope) -> Result<()> {
    let catalog = scan_catalog(storage_root, scope)?;
    let forest = tree::build(&catalog);
    if forest.is_empty() {
        println!("No conversations found");
        return Ok(());
    }

    for (depth, node) in forest.depth_first() {
        let marker = if depth == 0 { String::new() } else { format!("{}└─ ", "   ".repeat(depth - 1)) };
        let note = match node.link {
            Link::Root(RootReason::MissingParent) => "  (parent not found)",
            Link::Root(RootReason::CycleBroken) => "  (cycle broken)",
            _ => "",
        };
        println!("{marker}{}{note}", summary_line(&node.record));
    }
    Ok(())
}

fn branch(storage_root: &Path, id: &str, target: Option<&Path>) -> Result<()> {
    let catalog = scan_catalog(storage_root, &Scope::AllProjects)?;
    let created = branch_conversation(storage_root, &catalog, id, target)?;
    print_created("Created branch", &created);
    Ok(())
}

fn copy(storage_root: &Path, id: &str, target: &Path) -> Result<()> {
    let catalog = scan_catalog(storage_root, &Scope::AllProjects)?;
    let created = copy_conversation(storage_root, &catalog, id, target)?;
    print_created("Created copy", &created);
    Ok(())
}

fn print_created(label: &str, record: &ConversationRecord) {
    println!("{label} {}", record.id);
    if let Some(parent) = &record.parent_id {
        println!("  Parent:  {parent}");
    }
    println!("  Project: {}", format_path_with_tilde(&record.project_path));
    println!("  File:    {}", record.file_path.display());
}

fn ancestry(storage_root: &Path, id: &str) -> Result<()> {
    let catalog = scan_catalog(storage_root, &Scope::AllProjects)?;
    let record = catalog.resolve(id)?;

    for (depth, ancestor) in catalog.ancestry(&record.id).into_iter().enumerate() {
        println!("{}{}", "  ".repeat(depth), summary_line(ancestor));
    }
    Ok(())
}

fn show_stats(storage_root: &Path) -> Result<()> {
    let catalog = scan_catalog(storage_root, &Scope::AllProjects)?;
    let forest = tree::build(&catalog);

    let branches = catalog.iter().filter(|r| !r.is_root()).count();
    let records: usize = catalog.iter().map(|r| r.record_count).sum();

    println!("Conversation Store Statistics");
    println!("=============================");
    println!("Conversations: {}", catalog.len());
    println!("  Branches: {}", branches);
    println!("  Trees: {}", forest.roots().count());
    println!("Projects: {}", catalog.projects().len());
    println!("Transcript records: {}", records);
    println!("Warnings: {}", catalog.warnings().len());
    println!();
    println!("Storage root: {}", format_path_with_tilde(storage_root));

    let newest_first = catalog.conversations_newest_first();
    if let Some(oldest) = newest_first.last() {
        println!("Oldest activity: {}", oldest.last_modified_at.format(TIMESTAMP_FORMAT));
    }
    if let Some(newest) = newest_first.first() {
        println!("Newest activity: {}", newest.last_modified_at.format(TIMESTAMP_FORMAT));
    }

    Ok(())
}
