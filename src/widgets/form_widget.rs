use crate::model::{coerce_edit, display_value, FieldSpec, FieldType, FormSpec, FormValue, FormValues};
use crate::widgets::form::{draw_form, FormState};
use crossterm::event::KeyCode;
use ratatui::prelude::*;

/// One-way notifications from the form to its owner. The widget never
/// mutates the value map itself; every user edit becomes exactly one
/// `Change`, and activating the submit control becomes `Submit`.
#[derive(Clone, Debug, PartialEq)]
pub enum FormEffect {
    Change { field: String, value: FormValue },
    Submit,
}

/// Interactive wrapper over [`FormState`]: routes key events to edits,
/// selection moves, reveal toggles and submission.
pub struct DynamicForm {
    pub form: FormState,
}

impl DynamicForm {
    pub fn new(spec: &FormSpec) -> Self {
        Self {
            form: FormState::from_spec(spec),
        }
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        values: &FormValues,
        submitting: bool,
        focused: bool,
        tick: u64,
    ) {
        let cursor_on = self.form.editing && tick % 2 == 0;
        draw_form(f, area, &self.form, values, submitting, focused, cursor_on);
    }

    /// Handle one key event against the caller's current value map.
    pub fn on_key(
        &mut self,
        key: KeyCode,
        values: &FormValues,
        submitting: bool,
    ) -> Vec<FormEffect> {
        let mut effects: Vec<FormEffect> = Vec::new();
        let submit_idx = self.form.submit_index();
        match key {
            KeyCode::Up => {
                if self.form.editing {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        if fld.field_type == FieldType::Number {
                            effects.push(step_number(fld, values, 1.0));
                        }
                    }
                } else if self.form.selected > 0 {
                    self.form.selected -= 1;
                }
            }
            KeyCode::Down => {
                if self.form.editing {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        if fld.field_type == FieldType::Number {
                            effects.push(step_number(fld, values, -1.0));
                        }
                    }
                } else if self.form.selected < submit_idx {
                    self.form.selected += 1;
                }
            }
            KeyCode::Enter => {
                if self.form.editing {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        if fld.field_type == FieldType::Textarea {
                            let mut raw = display_value(values, &fld.name);
                            raw.push('\n');
                            effects.push(FormEffect::Change {
                                field: fld.name.clone(),
                                value: FormValue::Text(raw),
                            });
                        } else {
                            self.form.editing = false;
                        }
                    }
                } else if self.form.selected == submit_idx {
                    // Disabled while a submission is in flight.
                    if !submitting {
                        effects.push(FormEffect::Submit);
                    }
                } else if let Some(fld) = self.form.fields.get(self.form.selected) {
                    match fld.field_type {
                        FieldType::Checkbox => effects.push(toggle_checkbox(fld, values)),
                        _ => self.form.editing = true,
                    }
                }
            }
            KeyCode::Esc => {
                if self.form.editing {
                    self.form.editing = false;
                }
            }
            KeyCode::Backspace => {
                if self.form.editing {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        let mut raw = display_value(values, &fld.name);
                        if raw.pop().is_some() {
                            effects.push(FormEffect::Change {
                                field: fld.name.clone(),
                                value: coerce_edit(fld.field_type, raw),
                            });
                        }
                    }
                }
            }
            KeyCode::Char(c) => {
                if self.form.editing {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        let raw = display_value(values, &fld.name);
                        let accept = match fld.field_type {
                            FieldType::Number => accepts_number_char(&raw, c),
                            FieldType::Checkbox => false,
                            _ => true,
                        };
                        if accept {
                            let mut raw = raw;
                            raw.push(c);
                            effects.push(FormEffect::Change {
                                field: fld.name.clone(),
                                value: coerce_edit(fld.field_type, raw),
                            });
                        }
                    }
                } else if c == 'v' || c == 'V' {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        if fld.field_type == FieldType::Password {
                            let name = fld.name.clone();
                            self.form.toggle_reveal(&name);
                        }
                    }
                } else if c == ' ' {
                    if let Some(fld) = self.form.fields.get(self.form.selected) {
                        if fld.field_type == FieldType::Checkbox {
                            effects.push(toggle_checkbox(fld, values));
                        }
                    }
                }
            }
            _ => {}
        }
        effects
    }
}

fn toggle_checkbox(fld: &FieldSpec, values: &FormValues) -> FormEffect {
    let cur = values.get(&fld.name).map(|v| v.as_bool()).unwrap_or(false);
    FormEffect::Change {
        field: fld.name.clone(),
        value: FormValue::Bool(!cur),
    }
}

// Up/Down step a number field by 1 while editing.
fn step_number(fld: &FieldSpec, values: &FormValues, dir: f64) -> FormEffect {
    let cur = display_value(values, &fld.name)
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0);
    FormEffect::Change {
        field: fld.name.clone(),
        value: FormValue::Number(cur + dir),
    }
}

/// Gate keystrokes on number fields to numeric shapes: digits, one '.',
/// a leading '-'.
fn accepts_number_char(raw: &str, c: char) -> bool {
    c.is_ascii_digit() || (c == '.' && !raw.contains('.')) || (c == '-' && raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(fields: Vec<(&str, &str, FieldType)>) -> FormSpec {
        FormSpec {
            title: Some("T".into()),
            submit_label: None,
            fields: fields
                .into_iter()
                .map(|(name, label, ty)| FieldSpec {
                    name: name.into(),
                    label: label.into(),
                    field_type: ty,
                    required: false,
                    help_text: None,
                })
                .collect(),
            values: Default::default(),
        }
    }

    fn apply(values: &mut FormValues, effects: &[FormEffect]) {
        for eff in effects {
            if let FormEffect::Change { field, value } = eff {
                values.insert(field.clone(), value.clone());
            }
        }
    }

    #[test]
    fn typing_into_text_field_emits_exact_string_once() {
        let mut w = DynamicForm::new(&spec(vec![("name", "Name", FieldType::Text)]));
        let mut values = FormValues::new();
        values.insert("name".into(), FormValue::Text("Ad".into()));
        assert!(w.on_key(KeyCode::Enter, &values, false).is_empty()); // start editing
        assert!(w.form.editing);
        let effects = w.on_key(KeyCode::Char('a'), &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "name".into(),
                value: FormValue::Text("Ada".into()),
            }]
        );
    }

    #[test]
    fn number_edits_coerce_to_numeric_value() {
        let mut w = DynamicForm::new(&spec(vec![("age", "Age", FieldType::Number)]));
        let mut values = FormValues::new();
        let _ = w.on_key(KeyCode::Enter, &values, false);
        let effects = w.on_key(KeyCode::Char('4'), &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "age".into(),
                value: FormValue::Number(4.0),
            }]
        );
        apply(&mut values, &effects);
        let effects = w.on_key(KeyCode::Char('2'), &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "age".into(),
                value: FormValue::Number(42.0),
            }]
        );
    }

    #[test]
    fn number_field_rejects_non_numeric_chars() {
        let mut w = DynamicForm::new(&spec(vec![("age", "Age", FieldType::Number)]));
        let values = FormValues::new();
        let _ = w.on_key(KeyCode::Enter, &values, false);
        assert!(w.on_key(KeyCode::Char('x'), &values, false).is_empty());
        // one decimal point at most
        let mut values = FormValues::new();
        values.insert("age".into(), FormValue::Text("3.".into()));
        assert!(w.on_key(KeyCode::Char('.'), &values, false).is_empty());
    }

    #[test]
    fn clearing_a_number_field_passes_empty_text_not_nan() {
        let mut w = DynamicForm::new(&spec(vec![("age", "Age", FieldType::Number)]));
        let mut values = FormValues::new();
        values.insert("age".into(), FormValue::Number(4.0));
        let _ = w.on_key(KeyCode::Enter, &values, false);
        let effects = w.on_key(KeyCode::Backspace, &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "age".into(),
                value: FormValue::Text(String::new()),
            }]
        );
    }

    #[test]
    fn leading_minus_is_accepted_then_coerces_with_digits() {
        let mut w = DynamicForm::new(&spec(vec![("delta", "Delta", FieldType::Number)]));
        let mut values = FormValues::new();
        let _ = w.on_key(KeyCode::Enter, &values, false);
        let effects = w.on_key(KeyCode::Char('-'), &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "delta".into(),
                value: FormValue::Text("-".into()),
            }]
        );
        apply(&mut values, &effects);
        let effects = w.on_key(KeyCode::Char('7'), &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "delta".into(),
                value: FormValue::Number(-7.0),
            }]
        );
    }

    #[test]
    fn number_steps_with_arrows_while_editing() {
        let mut w = DynamicForm::new(&spec(vec![("age", "Age", FieldType::Number)]));
        let mut values = FormValues::new();
        values.insert("age".into(), FormValue::Number(10.0));
        let _ = w.on_key(KeyCode::Enter, &values, false);
        let up = w.on_key(KeyCode::Up, &values, false);
        assert_eq!(
            up,
            vec![FormEffect::Change {
                field: "age".into(),
                value: FormValue::Number(11.0),
            }]
        );
        let down = w.on_key(KeyCode::Down, &values, false);
        assert_eq!(
            down,
            vec![FormEffect::Change {
                field: "age".into(),
                value: FormValue::Number(9.0),
            }]
        );
    }

    #[test]
    fn checkbox_toggles_bool_without_editing_mode() {
        let mut w = DynamicForm::new(&spec(vec![("ok", "Ok", FieldType::Checkbox)]));
        let mut values = FormValues::new();
        let effects = w.on_key(KeyCode::Enter, &values, false);
        assert!(!w.form.editing);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "ok".into(),
                value: FormValue::Bool(true),
            }]
        );
        apply(&mut values, &effects);
        let effects = w.on_key(KeyCode::Char(' '), &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "ok".into(),
                value: FormValue::Bool(false),
            }]
        );
    }

    #[test]
    fn reveal_toggle_flips_only_the_selected_password() {
        let mut w = DynamicForm::new(&spec(vec![
            ("p1", "P1", FieldType::Password),
            ("p2", "P2", FieldType::Password),
        ]));
        let values = FormValues::new();
        assert!(w.on_key(KeyCode::Char('v'), &values, false).is_empty());
        assert!(w.form.is_revealed("p1"));
        assert!(!w.form.is_revealed("p2"));
    }

    #[test]
    fn reveal_key_ignored_on_non_password_fields() {
        let mut w = DynamicForm::new(&spec(vec![("name", "Name", FieldType::Text)]));
        let values = FormValues::new();
        let _ = w.on_key(KeyCode::Char('v'), &values, false);
        assert!(!w.form.is_revealed("name"));
    }

    #[test]
    fn enter_on_submit_control_emits_submit() {
        let mut w = DynamicForm::new(&spec(vec![("name", "Name", FieldType::Text)]));
        let values = FormValues::new();
        let _ = w.on_key(KeyCode::Down, &values, false);
        assert_eq!(w.form.selected, w.form.submit_index());
        let effects = w.on_key(KeyCode::Enter, &values, false);
        assert_eq!(effects, vec![FormEffect::Submit]);
    }

    #[test]
    fn submit_is_ignored_while_submitting() {
        let mut w = DynamicForm::new(&spec(vec![("name", "Name", FieldType::Text)]));
        let values = FormValues::new();
        let _ = w.on_key(KeyCode::Down, &values, false);
        assert!(w.on_key(KeyCode::Enter, &values, true).is_empty());
    }

    #[test]
    fn textarea_enter_appends_newline_and_esc_stops_editing() {
        let mut w = DynamicForm::new(&spec(vec![("bio", "Bio", FieldType::Textarea)]));
        let mut values = FormValues::new();
        values.insert("bio".into(), FormValue::Text("hi".into()));
        let _ = w.on_key(KeyCode::Enter, &values, false);
        assert!(w.form.editing);
        let effects = w.on_key(KeyCode::Enter, &values, false);
        assert_eq!(
            effects,
            vec![FormEffect::Change {
                field: "bio".into(),
                value: FormValue::Text("hi\n".into()),
            }]
        );
        let _ = w.on_key(KeyCode::Esc, &values, false);
        assert!(!w.form.editing);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut w = DynamicForm::new(&spec(vec![("name", "Name", FieldType::Text)]));
        let values = FormValues::new();
        let _ = w.on_key(KeyCode::Up, &values, false);
        assert_eq!(w.form.selected, 0);
        let _ = w.on_key(KeyCode::Down, &values, false);
        let _ = w.on_key(KeyCode::Down, &values, false);
        assert_eq!(w.form.selected, w.form.submit_index());
    }
}
