use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::editor::{
    CommitError, EditorOptions, EditorSession, KeyOutcome, handle_key, open_editor,
};
use crate::io::recovery::commit_with_recovery;
use crate::io::workspace::Workspace;
use crate::model::{ContentId, DesiredTag, Tag};
use crate::ops::load_tags;
use crate::store::TagStore;

use super::render;
use super::theme::Theme;

/// State of the terminal tag editor
pub struct EditorApp {
    pub session: EditorSession,
    /// Owner's registry, used for completions
    pub known_tags: Vec<Tag>,
    pub theme: Theme,
    pub should_quit: bool,
    /// Last commit error, cleared on the next successful save
    pub error: Option<String>,
    /// Tag list as last persisted
    saved: Vec<DesiredTag>,
    /// Esc was pressed once with unsaved edits
    confirm_discard: bool,
}

impl EditorApp {
    pub fn new(session: EditorSession, known_tags: Vec<Tag>) -> Self {
        let saved = session.desired_tags();
        EditorApp {
            session,
            known_tags,
            theme: Theme::default(),
            should_quit: false,
            error: None,
            saved,
            confirm_discard: false,
        }
    }

    /// Local edits not yet persisted
    pub fn is_dirty(&self) -> bool {
        self.session.desired_tags() != self.saved
    }

    pub fn is_confirming_discard(&self) -> bool {
        self.confirm_discard
    }

    /// Apply a key. `commit` persists the session when the key asks for it.
    pub fn handle_key<F>(&mut self, key: KeyEvent, commit: F)
    where
        F: FnOnce(&mut EditorSession) -> Result<(), CommitError>,
    {
        let outcome = handle_key(&mut self.session, key);
        if outcome != KeyOutcome::Close {
            self.confirm_discard = false;
        }
        match outcome {
            KeyOutcome::Commit => match commit(&mut self.session) {
                Ok(()) => {
                    self.saved = self.session.desired_tags();
                    self.error = None;
                }
                Err(e) => self.error = Some(e.to_string()),
            },
            KeyOutcome::Close => {
                if self.is_dirty() && !self.confirm_discard && !self.session.is_read_only() {
                    self.confirm_discard = true;
                } else {
                    self.should_quit = true;
                }
            }
            KeyOutcome::Handled | KeyOutcome::Ignored => {}
        }
    }

    /// Record a tag created by a successful commit so it shows up in completions.
    pub fn refresh_known_tags(&mut self, tags: Vec<Tag>) {
        self.known_tags = tags;
    }
}

/// Run the tag editor for one content item
pub fn run(
    ws: &Workspace,
    content: ContentId,
    read_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = ws.store();
    let owner = ws.owner();
    let initial = load_tags(&store, &content)?;
    let known = store.list_tags(&owner)?;

    let mut options = EditorOptions::from(&ws.config.editor);
    options.read_only |= read_only;
    let mut app = EditorApp::new(open_editor(content, initial, options), known);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, ws);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut EditorApp,
    ws: &Workspace,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let mut saved = false;
            app.handle_key(key, |session| {
                commit_with_recovery(ws, session)?;
                saved = true;
                Ok(())
            });
            if saved {
                match ws.store().list_tags(&ws.owner()) {
                    Ok(tags) => app.refresh_known_tags(tags),
                    Err(e) => tracing::warn!(error = %e, "could not reload tag registry"),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
