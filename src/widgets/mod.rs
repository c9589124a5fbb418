pub mod form;
pub mod form_widget;

use ratatui::widgets::{Block, Borders};

pub fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let b = Block::default().borders(Borders::ALL).title(title);
    if focused {
        b.border_style(crate::theme::border_focused())
    } else {
        b.border_style(crate::theme::border_unfocused())
    }
}
