use crate::model::{display_value, FieldSpec, FieldType, FormSpec, FormValues};
use crate::widgets::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::HashMap;

pub const DEFAULT_SUBMIT_LABEL: &str = "Submit";
pub const SUBMITTING_LABEL: &str = "Submitting...";
/// Visible rows of a textarea control; longer content folds.
pub const TEXTAREA_ROWS: usize = 3;

/// Presentation state of a dynamic form. Field descriptors and selection
/// live here; field *values* never do — they stay in the caller's map and
/// are borrowed at draw time.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub submit_label: Option<String>,
    pub selected: usize,
    pub editing: bool,
    // Per-field password reveal flags; absent = masked.
    revealed: HashMap<String, bool>,
}

impl FormState {
    pub fn from_spec(spec: &FormSpec) -> Self {
        Self {
            title: spec.title.clone().unwrap_or_else(|| "Form".into()),
            fields: spec.fields.clone(),
            submit_label: spec.submit_label.clone(),
            selected: 0,
            editing: false,
            revealed: HashMap::new(),
        }
    }

    /// Index of the trailing submit control in the selection order.
    pub fn submit_index(&self) -> usize {
        self.fields.len()
    }

    pub fn is_revealed(&self, name: &str) -> bool {
        self.revealed.get(name).copied().unwrap_or(false)
    }

    /// Flip the reveal flag for one password field. Local state only;
    /// sibling fields and the value map are untouched.
    pub fn toggle_reveal(&mut self, name: &str) {
        let entry = self.revealed.entry(name.to_string()).or_insert(false);
        *entry = !*entry;
    }

    pub fn submit_text(&self, submitting: bool) -> &str {
        if submitting {
            SUBMITTING_LABEL
        } else {
            self.submit_label.as_deref().unwrap_or(DEFAULT_SUBMIT_LABEL)
        }
    }
}

pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    form: &FormState,
    values: &FormValues,
    submitting: bool,
    highlight: bool,
    cursor_on: bool,
) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, fld) in form.fields.iter().enumerate() {
        let sel = if i == form.selected { '›' } else { ' ' };
        let req = if fld.required { " *" } else { "" };
        let value_style = if i == form.selected {
            if form.editing {
                crate::theme::text_editing_bold()
            } else {
                crate::theme::text_active_bold()
            }
        } else {
            Style::default()
        };
        match fld.field_type {
            FieldType::Textarea => {
                lines.push(Line::from(format!("{sel} {}{req}:", fld.label)));
                let text = display_value(values, &fld.name);
                let mut rows: Vec<String> = if text.is_empty() {
                    vec![String::new()]
                } else {
                    text.lines().map(|l| l.to_string()).collect()
                };
                let total = rows.len();
                let folded = total > TEXTAREA_ROWS;
                if folded {
                    rows.truncate(TEXTAREA_ROWS);
                }
                if form.editing && i == form.selected && cursor_on {
                    if let Some(last) = rows.last_mut() {
                        last.push('▏');
                    }
                }
                for row in rows {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(row, value_style),
                    ]));
                }
                if folded {
                    let more = total - TEXTAREA_ROWS;
                    lines.push(Line::from(Span::styled(
                        format!(
                            "  … ({} more line{})",
                            more,
                            if more == 1 { "" } else { "s" }
                        ),
                        crate::theme::text_muted(),
                    )));
                }
            }
            FieldType::Password => {
                let raw = display_value(values, &fld.name);
                let mut shown = if form.is_revealed(&fld.name) {
                    raw.clone()
                } else {
                    "•".repeat(raw.chars().count())
                };
                if form.editing && i == form.selected && cursor_on {
                    shown.push('▏');
                }
                let mut spans = vec![
                    Span::raw(format!("{sel} {}{req}: ", fld.label)),
                    Span::styled(shown, value_style),
                ];
                if i == form.selected {
                    let hint = if form.is_revealed(&fld.name) {
                        "  [v hide]"
                    } else {
                        "  [v show]"
                    };
                    spans.push(Span::styled(hint, crate::theme::text_muted()));
                }
                lines.push(Line::from(spans));
            }
            FieldType::Checkbox => {
                let checked = values.get(&fld.name).map(|v| v.as_bool()).unwrap_or(false);
                let val = if checked { "[x]" } else { "[ ]" };
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}: ", fld.label)),
                    Span::styled(val, value_style),
                ]));
            }
            // Single-line text control; Unknown is the default arm.
            FieldType::Number | FieldType::Text | FieldType::Unknown => {
                let mut val = display_value(values, &fld.name);
                if form.editing && i == form.selected && cursor_on {
                    val.push('▏');
                }
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}: ", fld.label)),
                    Span::styled(val, value_style),
                ]));
            }
        }
        if let Some(help) = &fld.help_text {
            lines.push(Line::from(Span::styled(
                format!("  {help}"),
                crate::theme::text_muted(),
            )));
        }
    }
    // Trailing submit control; disabled with a fixed label while submitting.
    if !form.fields.is_empty() {
        lines.push(Line::from(""));
    }
    let label = form.submit_text(submitting);
    let submit_style = if submitting {
        crate::theme::text_muted()
    } else if form.selected == form.submit_index() {
        crate::theme::list_cursor_style()
    } else {
        crate::theme::text_active_bold()
    };
    lines.push(Line::from(Span::styled(
        format!("  [ {label} ]"),
        submit_style,
    )));
    let title = if form.editing {
        format!("{} — editing", form.title)
    } else {
        form.title.clone()
    };
    let block = panel_block(&title, highlight);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
