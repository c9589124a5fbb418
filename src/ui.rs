use crate::app::{update, AppMsg, AppState, Effect};
use crate::model::FormSpec;
use crate::widgets::form_widget::FormEffect;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

const DEMO_FORM: &str = include_str!("../config/form.yaml");

/// Form spec comes from the first CLI arg, then `config/form.yaml` in the
/// working directory, then the built-in demo form.
fn load_form_spec() -> Result<FormSpec> {
    if let Some(path) = std::env::args().nth(1) {
        let s =
            fs::read_to_string(&path).with_context(|| format!("reading form spec: {path}"))?;
        return serde_yaml::from_str(&s).with_context(|| format!("parsing form spec: {path}"));
    }
    let default = "config/form.yaml";
    if Path::new(default).exists() {
        let s = fs::read_to_string(default)
            .with_context(|| format!("reading form spec: {default}"))?;
        return serde_yaml::from_str(&s)
            .with_context(|| format!("parsing form spec: {default}"));
    }
    serde_yaml::from_str(DEMO_FORM).context("parsing built-in demo form")
}

pub fn run() -> Result<()> {
    let spec = load_form_spec()?;
    let mut state = AppState::new(spec);
    let (tx, rx) = mpsc::channel::<AppMsg>();

    // Headless smoke mode: render into a TestBackend for a fixed number of
    // ticks, no input.
    let headless = std::env::var("DYNFORM_HEADLESS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    if headless {
        let ticks: u64 = std::env::var("DYNFORM_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend)?;
        for _ in 0..ticks {
            terminal.draw(|f| draw_ui(f, &state))?;
            while let Ok(msg) = rx.try_recv() {
                let effects = update(&mut state, msg);
                run_effects(effects, &tx);
            }
            state.tick = state.tick.wrapping_add(1);
            std::thread::sleep(Duration::from_millis(50));
        }
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') if !state.form.form.editing => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    code => dispatch_key(&mut state, code, &tx),
                }
            }
        }
        while let Ok(msg) = rx.try_recv() {
            let effects = update(&mut state, msg);
            run_effects(effects, &tx);
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn dispatch_key(state: &mut AppState, code: KeyCode, tx: &Sender<AppMsg>) {
    let form_effects = state.form.on_key(code, &state.values, state.submitting);
    for eff in form_effects {
        let msg = match eff {
            FormEffect::Change { field, value } => AppMsg::FieldEdited { field, value },
            FormEffect::Submit => AppMsg::SubmitRequested,
        };
        let effects = update(state, msg);
        run_effects(effects, tx);
    }
}

fn run_effects(effects: Vec<Effect>, tx: &Sender<AppMsg>) {
    for eff in effects {
        match eff {
            Effect::PerformSubmit { payload } => {
                // Demo submission: a worker thread stands in for a backend
                // and echoes the payload back once accepted.
                let tx = tx.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(600));
                    let _ = tx.send(AppMsg::SubmitDone {
                        result: Ok(payload),
                    });
                });
            }
        }
    }
}

fn draw_ui(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(f.area());
    state
        .form
        .render(f, chunks[0], &state.values, state.submitting, true, state.tick);
    draw_result(f, chunks[1], state);
    draw_footer(f, chunks[2], state);
}

fn draw_result(f: &mut Frame, area: Rect, state: &AppState) {
    let body: Vec<Line> = if let Some(err) = &state.last_error {
        vec![Line::from(Span::styled(
            err.clone(),
            crate::theme::text_error(),
        ))]
    } else if let Some(res) = &state.last_result {
        res.lines().map(|l| Line::from(l.to_string())).collect()
    } else {
        vec![Line::from(Span::styled(
            "(nothing submitted yet)",
            crate::theme::text_muted(),
        ))]
    };
    let block = crate::widgets::panel_block("Last submission", false);
    f.render_widget(
        Paragraph::new(body).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_footer(f: &mut Frame, area: Rect, state: &AppState) {
    let hint = if state.submitting {
        "Submitting..."
    } else if state.form.form.editing {
        "type to edit • Enter done (newline in textarea) • Esc done"
    } else {
        "↑/↓ move • Enter edit/submit • v reveal password • q quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, crate::theme::text_muted())),
        area,
    );
}
