use crate::model::{FormSpec, FormValue, FormValues};
use crate::widgets::form_widget::DynamicForm;
use serde_json::Value as JsonValue;

/// Messages driving the owner of the form. The widget's effects map onto
/// `FieldEdited` / `SubmitRequested`; the background submit worker reports
/// back with `SubmitDone`.
pub enum AppMsg {
    FieldEdited {
        field: String,
        value: FormValue,
    },
    SubmitRequested,
    SubmitDone {
        result: Result<JsonValue, String>,
    },
}

pub enum Effect {
    PerformSubmit { payload: JsonValue },
}

/// Owner-side state: the authoritative value map, the in-flight flag and
/// the last submission outcome. The form widget itself holds no form data.
pub struct AppState {
    pub form: DynamicForm,
    pub values: FormValues,
    pub submitting: bool,
    pub last_result: Option<String>,
    pub last_error: Option<String>,
    pub tick: u64,
}

impl AppState {
    pub fn new(spec: FormSpec) -> Self {
        let form = DynamicForm::new(&spec);
        Self {
            form,
            values: spec.values,
            submitting: false,
            last_result: None,
            last_error: None,
            tick: 0,
        }
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    match msg {
        AppMsg::FieldEdited { field, value } => {
            state.values.insert(field, value);
            Vec::new()
        }
        AppMsg::SubmitRequested => {
            if state.submitting {
                return Vec::new();
            }
            state.submitting = true;
            let payload = serde_json::to_value(&state.values).unwrap_or(JsonValue::Null);
            vec![Effect::PerformSubmit { payload }]
        }
        AppMsg::SubmitDone { result } => {
            state.submitting = false;
            match result {
                Ok(v) => {
                    state.last_error = None;
                    state.last_result = serde_json::to_string_pretty(&v).ok();
                }
                Err(e) => {
                    state.last_error = Some(e);
                }
            }
            Vec::new()
        }
    }
}
