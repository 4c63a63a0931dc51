mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::editor::{AddOutcome, EditorOptions, EditorSession, open_editor};
use crate::io::recovery::{self, RecoveryCategory, commit_with_recovery};
use crate::io::workspace::{self, Workspace, WorkspaceError};
use crate::logging;
use crate::model::{ContentId, DesiredTag, normalize_tag_name};
use crate::ops::{TagError, load_tags, sync_tags};
use crate::store::TagStore;

/// Global flags shared by every command
pub struct Context {
    pub json: bool,
    pub verbose: bool,
    pub workspace_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let workspace_dir = match cli.workspace_dir {
        Some(ref dir) => Some(
            std::fs::canonicalize(dir)
                .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        ),
        None => None,
    };
    let ctx = Context {
        json: cli.json,
        verbose: cli.verbose,
        workspace_dir,
    };

    match cli.command {
        // Init runs before any workspace exists
        Commands::Init(args) => cmd_init(&ctx, args),

        Commands::Tags => cmd_tags(&ctx),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Recovery(args) => cmd_recovery(&ctx, args),

        Commands::Set(args) => cmd_set(&ctx, args),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
    }
}

fn start_dir(ctx: &Context) -> Result<PathBuf, WorkspaceError> {
    match &ctx.workspace_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Find and load the workspace, then bring up logging from its config.
/// The terminal editor logs to `tagdeck/td.log` instead of stderr.
fn load_workspace_cwd(ctx: &Context, tui_mode: bool) -> Result<Workspace, WorkspaceError> {
    let root = workspace::discover_workspace(&start_dir(ctx)?)?;
    let ws = workspace::load_workspace(&root)?;
    if tui_mode {
        logging::init_tui_logging(&ws.config.log.filter, ctx.verbose, &ws.dir);
    } else {
        logging::init_logging(&ws.config.log.filter, ctx.verbose);
    }
    Ok(ws)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_tags(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, false)?;
    let tags = ws.store().list_tags(&ws.owner())?;

    if ctx.json {
        let out: Vec<TagJson> = tags.iter().map(tag_to_json).collect();
        return print_json(&out);
    }
    if tags.is_empty() {
        println!("no tags yet");
    }
    for tag in &tags {
        println!("{}", format_registry_line(tag));
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, false)?;
    let entries = load_tags(&ws.store(), &ContentId::new(args.content.clone()))?;

    if ctx.json {
        return print_json(&content_tags_json(&args.content, &entries));
    }
    println!("{}", format_content_line(&args.content, &entries));
    Ok(())
}

fn cmd_recovery(ctx: &Context, args: RecoveryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, false)?;
    let entries = recovery::read_recovery_entries(&ws.dir, args.limit);

    if ctx.json {
        let out: Vec<RecoveryEntryJson> = entries.iter().map(recovery_entry_to_json).collect();
        return print_json(&out);
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{} {}: {}",
            entry
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            entry.category,
            entry.description
        );
        for (key, value) in &entry.fields {
            println!("  {}: {}", key, value);
        }
        for line in entry.body.lines() {
            println!("    {}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_set(ctx: &Context, args: SetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, false)?;
    if ws.config.editor.read_only {
        return Err("workspace is configured read-only".into());
    }
    let store = ws.store();
    let content = ContentId::new(args.content.clone());

    let desired: Vec<DesiredTag> = args
        .tags
        .iter()
        .map(DesiredTag::confirmed)
        .chain(args.suggested.iter().map(DesiredTag::suggested))
        .collect();

    if let Err(e) = sync_tags(&store, &content, &ws.owner(), &desired) {
        if let TagError::Persistence(_) = e {
            recovery::log_failed_save(
                &ws.dir,
                RecoveryCategory::Sync,
                &content,
                &desired,
                &e.to_string(),
            );
        }
        return Err(e.into());
    }

    let entries = load_tags(&store, &content)?;
    if ctx.json {
        return print_json(&content_tags_json(&args.content, &entries));
    }
    println!("{}", format_content_line(&args.content, &entries));
    Ok(())
}

fn cmd_add(ctx: &Context, args: TagArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, false)?;
    let mut session = open_session(&ws, &args.content)?;

    session.set_input_text(args.tag.clone());
    match session.request_add() {
        AddOutcome::Added(_) => {}
        AddOutcome::Duplicate => {
            println!("{} already has tag {}", args.content, args.tag.trim());
            return Ok(());
        }
        AddOutcome::Invalid(e) => return Err(e.into()),
        AddOutcome::LimitReached => {
            return Err(format!(
                "{} already has the maximum of {} tags",
                args.content,
                session.options().max_tags.unwrap_or_default()
            )
            .into());
        }
        AddOutcome::ReadOnly => return Err("workspace is configured read-only".into()),
        AddOutcome::Debounced | AddOutcome::Busy => {
            return Err("editor is busy, try again".into());
        }
    }

    commit_session(ctx, &ws, &mut session)
}

fn cmd_rm(ctx: &Context, args: TagArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, false)?;
    let mut session = open_session(&ws, &args.content)?;

    let wanted = normalize_tag_name(&args.tag);
    let chip = session
        .tags()
        .iter()
        .find(|c| normalize_tag_name(&c.name) == wanted)
        .map(|c| c.id)
        .ok_or_else(|| format!("{} has no tag {}", args.content, args.tag.trim()))?;
    if !session.request_remove(chip) {
        return Err("workspace is configured read-only".into());
    }

    commit_session(ctx, &ws, &mut session)
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx, true)?;
    crate::tui::run(&ws, ContentId::new(args.content), args.read_only)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Headless editor session seeded with the content's persisted tags
fn open_session(ws: &Workspace, content: &str) -> Result<EditorSession, TagError> {
    let content = ContentId::new(content);
    let initial = load_tags(&ws.store(), &content)?;
    Ok(open_editor(
        content,
        initial,
        EditorOptions::from(&ws.config.editor),
    ))
}

fn commit_session(
    ctx: &Context,
    ws: &Workspace,
    session: &mut EditorSession,
) -> Result<(), Box<dyn std::error::Error>> {
    // The add/remove announcement is what the user sees on success
    let announcement = session.take_announcement();
    commit_with_recovery(ws, session)?;

    let entries = load_tags(&ws.store(), session.content_id())?;
    if ctx.json {
        return print_json(&content_tags_json(session.content_id().as_str(), &entries));
    }
    if let Some(a) = announcement {
        println!("{}", a.message);
    }
    println!("{}", format_content_line(session.content_id().as_str(), &entries));
    Ok(())
}
