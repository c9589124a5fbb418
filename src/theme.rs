use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub accent: Color,
    pub selected: Color,
    pub frame: Color,
    pub error: Color,
    pub muted: Color,
    pub bg: Color,
}

impl Theme {
    pub fn midnight() -> Self {
        Self {
            accent: Color::Rgb(80, 170, 255),
            selected: Color::Rgb(255, 140, 0),
            frame: Color::Rgb(95, 95, 105),
            error: Color::Red,
            muted: Color::DarkGray,
            bg: Color::Rgb(22, 22, 26),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::midnight()
    }
}

// Style helpers that use the theme
impl Theme {
    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.selected)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn text_active_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_editing_bold(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn list_cursor_style(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }
}

// Module-level helpers over the default theme; widgets call these so they
// stay free of theme plumbing.
pub fn border_focused() -> Style {
    Theme::default().border_focused()
}

pub fn border_unfocused() -> Style {
    Theme::default().border_unfocused()
}

pub fn text_active_bold() -> Style {
    Theme::default().text_active_bold()
}

pub fn text_editing_bold() -> Style {
    Theme::default().text_editing_bold()
}

pub fn text_muted() -> Style {
    Theme::default().text_muted()
}

pub fn text_error() -> Style {
    Theme::default().text_error()
}

pub fn list_cursor_style() -> Style {
    Theme::default().list_cursor_style()
}
