use ratatui::style::{Color, Modifier, Style};

use crate::editor::TagChip;

/// Color theme for the tag editor
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub green: Color,
    pub purple: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
        }
    }
}

impl Theme {
    /// Style for a chip: suggestions are dimmed and italic, auto-generated
    /// tags purple, the focused chip reversed onto the selection color.
    pub fn chip_style(&self, chip: &TagChip, focused: bool) -> Style {
        let fg = if !chip.confirmed {
            self.dim
        } else if chip.auto_generated {
            self.purple
        } else {
            self.text
        };
        let mut style = Style::default().fg(fg).bg(self.background);
        if !chip.confirmed {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if focused {
            style = style
                .fg(self.text_bright)
                .bg(self.selection_bg)
                .add_modifier(Modifier::BOLD);
        }
        style
    }
}
