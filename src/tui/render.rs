use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::util::unicode;

use super::app::EditorApp;

/// Completions shown under the input line
const MAX_COMPLETIONS: usize = 6;

/// Main render function
pub fn render(frame: &mut Frame, app: &EditorApp) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title | chips | input | completions | status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + separator
            Constraint::Min(1),    // chips
            Constraint::Length(1), // input
            Constraint::Length(1), // completions
            Constraint::Length(1), // status row
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    render_chips(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_completions(frame, app, chunks[3]);
    render_status_row(frame, app, chunks[4]);
}

fn render_title(frame: &mut Frame, app: &EditorApp, area: Rect) {
    let bg = app.theme.background;
    let mut spans = vec![Span::styled(
        format!(" Tags for {}", app.session.content_id()),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if app.session.is_read_only() {
        spans.push(Span::styled(
            "  [read-only]",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    if app.is_dirty() {
        spans.push(Span::styled(
            "  *",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }
    let separator = Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.dim).bg(bg),
    );
    let paragraph = Paragraph::new(vec![Line::from(spans), Line::from(separator)])
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn render_chips(frame: &mut Frame, app: &EditorApp, area: Rect) {
    let bg = app.theme.background;
    let tags = app.session.tags();
    let focused = app.session.focused_index();

    let line = if tags.is_empty() {
        Line::from(Span::styled(
            " (no tags)",
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    } else {
        let mut spans = vec![Span::styled(" ", Style::default().bg(bg))];
        for (i, chip) in tags.iter().enumerate() {
            let label = if chip.confirmed {
                format!("#{}", chip.name)
            } else {
                format!("#{}?", chip.name)
            };
            spans.push(Span::styled(
                label,
                app.theme.chip_style(chip, focused == Some(i)),
            ));
            spans.push(Span::styled("  ", Style::default().bg(bg)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(line)
        .style(Style::default().bg(bg))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, app: &EditorApp, area: Rect) {
    let bg = app.theme.background;
    let prompt = " > ";
    let width = (area.width as usize).saturating_sub(prompt.len() + 1);
    let text = unicode::truncate_to_width(app.session.input(), width);

    let mut spans = vec![
        Span::styled(prompt, Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(text, Style::default().fg(app.theme.text_bright).bg(bg)),
    ];
    if app.session.focused_index().is_none() && !app.session.is_read_only() {
        spans.push(Span::styled(
            "\u{258C}",
            Style::default().fg(app.theme.highlight).bg(bg),
        )); // ▌ cursor
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

fn render_completions(frame: &mut Frame, app: &EditorApp, area: Rect) {
    let bg = app.theme.background;
    let completions = app.session.completions(&app.known_tags);
    if completions.is_empty() {
        frame.render_widget(Block::default().style(Style::default().bg(bg)), area);
        return;
    }
    let mut spans = vec![Span::styled("   ", Style::default().bg(bg))];
    for tag in completions.iter().take(MAX_COMPLETIONS) {
        spans.push(Span::styled(
            tag.name.clone(),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        spans.push(Span::styled("  ", Style::default().bg(bg)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

/// Render the status row: error, discard prompt, last announcement, or key hints
fn render_status_row(frame: &mut Frame, app: &EditorApp, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (message, color) = if let Some(ref err) = app.error {
        (err.clone(), app.theme.red)
    } else if app.is_confirming_discard() {
        (
            "Unsaved changes. Esc again to discard, Ctrl-S to save".to_string(),
            app.theme.highlight,
        )
    } else if let Some(a) = app.session.announcement() {
        (a.message.clone(), app.theme.green)
    } else {
        (String::new(), app.theme.text)
    };

    let mut spans = vec![Span::styled(
        format!(" {}", message),
        Style::default().fg(color).bg(bg),
    )];
    let hint = if app.session.is_read_only() {
        "\u{2190}\u{2192} move  Esc quit"
    } else {
        "Enter add  \u{2190}\u{2192} move  ^S save  Esc quit"
    };
    let content_width = unicode::display_width(&spans[0].content);
    let hint_width = unicode::display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::editor::{Direction as Nav, EditorOptions, open_editor};
    use crate::model::{ContentId, OwnerId, Tag, TagId, TaggedEntry, normalize_tag_name};

    const TERM_W: u16 = 60;
    const TERM_H: u16 = 8;

    /// Render into an in-memory buffer and return plain text (no styles).
    fn render_to_string(app: &EditorApp) -> String {
        let backend = TestBackend::new(TERM_W, TERM_H);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buf = terminal.backend().buffer().clone();
        let w = buf.area.width as usize;
        let lines: Vec<String> = buf
            .content
            .chunks(w)
            .map(|row| {
                let s: String = row.iter().map(|cell| cell.symbol()).collect();
                s.trim_end().to_string()
            })
            .collect();
        lines.join("\n")
    }

    fn tag(id: u64, name: &str) -> Tag {
        Tag {
            id: TagId(id),
            name: name.into(),
            normalized_name: normalize_tag_name(name),
            auto_generated: false,
            owner_id: OwnerId::new("me"),
        }
    }

    fn app_with(entries: Vec<(Tag, bool)>, options: EditorOptions, known: Vec<Tag>) -> EditorApp {
        let initial = entries
            .into_iter()
            .map(|(tag, confirmed)| TaggedEntry { tag, confirmed })
            .collect();
        EditorApp::new(open_editor(ContentId::new("b1"), initial, options), known)
    }

    #[test]
    fn renders_chips_with_suggestion_marker() {
        let app = app_with(
            vec![(tag(1, "React"), true), (tag(2, "AI"), false)],
            EditorOptions::default(),
            vec![],
        );
        let out = render_to_string(&app);
        assert!(out.contains("Tags for b1"));
        assert!(out.contains("#React  #AI?"));
        assert!(out.contains("^S save"));
    }

    #[test]
    fn empty_session_shows_placeholder() {
        let app = app_with(vec![], EditorOptions::default(), vec![]);
        assert!(render_to_string(&app).contains("(no tags)"));
    }

    #[test]
    fn read_only_marks_title_and_hides_edit_hints() {
        let options = EditorOptions {
            read_only: true,
            ..EditorOptions::default()
        };
        let app = app_with(vec![(tag(1, "React"), true)], options, vec![]);
        let out = render_to_string(&app);
        assert!(out.contains("[read-only]"));
        assert!(!out.contains("^S save"));
    }

    #[test]
    fn completions_follow_input() {
        let mut app = app_with(
            vec![(tag(1, "rust"), true)],
            EditorOptions::default(),
            vec![tag(1, "rust"), tag(2, "rustc"), tag(3, "go")],
        );
        app.session.set_input_text("ru");
        let out = render_to_string(&app);
        assert!(out.contains("> ru"));
        assert!(out.contains("rustc"));
        assert!(!out.contains(" go "));
    }

    #[test]
    fn announcement_and_error_in_status_row() {
        let mut app = app_with(vec![(tag(1, "React"), true)], EditorOptions::default(), vec![]);
        app.session.navigate(Nav::Left);
        let chip = app.session.focused_chip().map(|c| c.id).unwrap();
        app.session.request_remove(chip);
        assert!(render_to_string(&app).contains("Tag React removed"));

        app.error = Some("could not save tags: store unavailable".into());
        assert!(render_to_string(&app).contains("could not save tags"));
    }
}
