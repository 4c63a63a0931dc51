use crate::cli::commands::InitArgs;
use crate::cli::handlers::Context;
use crate::io::workspace::{self, WORKSPACE_DIR};
use crate::logging;

/// Validate an owner id: non-blank, no surrounding whitespace.
fn validate_owner(owner: &str) -> Result<(), String> {
    if owner.trim().is_empty() {
        return Err("owner id cannot be empty".to_string());
    }
    if owner.trim() != owner {
        return Err(format!(
            "owner id \"{}\" has leading or trailing whitespace",
            owner
        ));
    }
    Ok(())
}

pub fn cmd_init(ctx: &Context, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging("tagdeck=info", ctx.verbose);
    validate_owner(&args.owner)?;

    let root = match &ctx.workspace_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    // Nested workspaces shadow their parent; say so
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(WORKSPACE_DIR).display()
        );
        eprintln!("Creating new workspace in ./{}/", WORKSPACE_DIR);
    }

    let ws = workspace::init_workspace(&root, &args.owner, args.force)?;
    tracing::info!(owner = %ws.config.owner.id, dir = %ws.dir.display(), "workspace initialized");

    println!(
        "Initialized tagdeck workspace for {} in {}",
        ws.config.owner.id,
        ws.root.display()
    );
    println!("  store: {}", ws.store().path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_validation() {
        assert!(validate_owner("alice").is_ok());
        assert!(validate_owner("team:design").is_ok());
        assert!(validate_owner("").is_err());
        assert!(validate_owner("   ").is_err());
        assert!(validate_owner(" alice").is_err());
    }
}
