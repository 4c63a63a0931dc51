use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::MAX_TAG_NAME_LEN;
use crate::util::unicode::{pop_grapheme, word_boundary_left};

use super::session::{Direction, EditorSession};

/// What the host should do after a key was applied to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Session state changed (or the key was consumed)
    Handled,
    /// Key has no meaning for the tag editor
    Ignored,
    /// Host should run `commit` (needs the store, so it is not done here)
    Commit,
    /// Host should close the editor
    Close,
}

/// Handle a key event in the tag editor
pub fn handle_key(session: &mut EditorSession, key: KeyEvent) -> KeyOutcome {
    handle_key_at(session, key, Instant::now())
}

pub fn handle_key_at(session: &mut EditorSession, key: KeyEvent, now: Instant) -> KeyOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let focused = session.focused_chip().map(|c| (c.id, c.confirmed));

    match key.code {
        KeyCode::Char('s') if ctrl => KeyOutcome::Commit,
        KeyCode::Char('w') if ctrl => {
            let mut text = session.input().to_string();
            text.truncate(word_boundary_left(&text));
            session.set_input_text(text);
            KeyOutcome::Handled
        }
        KeyCode::Esc => {
            if focused.is_some() {
                session.focus_input();
                KeyOutcome::Handled
            } else {
                KeyOutcome::Close
            }
        }
        KeyCode::Enter => {
            match focused {
                // Enter on a suggested chip accepts it
                Some((id, false)) => {
                    session.request_confirm(id);
                }
                Some((_, true)) => session.focus_input(),
                None => {
                    session.request_add_at(now);
                }
            }
            KeyOutcome::Handled
        }
        KeyCode::Left => navigate(session, Direction::Left),
        KeyCode::Right => navigate(session, Direction::Right),
        KeyCode::Backspace | KeyCode::Delete if focused.is_some() => {
            if let Some((id, _)) = focused {
                session.request_remove(id);
            }
            KeyOutcome::Handled
        }
        KeyCode::Backspace => {
            if session.input().is_empty() {
                session.remove_last();
            } else {
                let mut text = session.input().to_string();
                pop_grapheme(&mut text);
                session.set_input_text(text);
            }
            KeyOutcome::Handled
        }
        KeyCode::Char(c) if !ctrl => {
            session.focus_input();
            if session.input().chars().count() < MAX_TAG_NAME_LEN {
                let mut text = session.input().to_string();
                text.push(c);
                session.set_input_text(text);
            }
            KeyOutcome::Handled
        }
        _ => KeyOutcome::Ignored,
    }
}

fn navigate(session: &mut EditorSession, direction: Direction) -> KeyOutcome {
    if session.navigate(direction) {
        KeyOutcome::Handled
    } else {
        KeyOutcome::Ignored
    }
}
