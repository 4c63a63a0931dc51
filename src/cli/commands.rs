use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("tagdeck v", env!("CARGO_PKG_VERSION"), " - tags for everything you bookmark"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a tagdeck workspace in the current directory
    Init(InitArgs),
    /// List the owner's tag registry
    Tags,
    /// Show the tags on a content item
    Show(ShowArgs),
    /// Replace the tags on a content item
    Set(SetArgs),
    /// Add one tag to a content item
    Add(TagArgs),
    /// Remove one tag from a content item
    Rm(TagArgs),
    /// Open the interactive tag editor for a content item
    Edit(EditArgs),
    /// List tag edits that could not be saved
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Owner id for the tag registry
    #[arg(long, default_value = "me")]
    pub owner: String,
    /// Overwrite an existing config (the store is kept)
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Content id (bookmark, note, ...)
    pub content: String,
}

#[derive(Args)]
pub struct SetArgs {
    /// Content id
    pub content: String,
    /// Tags the user confirmed, in display order
    pub tags: Vec<String>,
    /// Suggested tags to attach unconfirmed (repeatable)
    #[arg(long = "suggested", value_name = "TAG")]
    pub suggested: Vec<String>,
}

#[derive(Args)]
pub struct TagArgs {
    /// Content id
    pub content: String,
    /// Tag name
    pub tag: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Content id
    pub content: String,
    /// Browse tags without editing
    #[arg(long)]
    pub read_only: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}
