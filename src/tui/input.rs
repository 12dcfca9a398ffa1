use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::{BPM_NUDGE, Field, InputEvent};
use super::mode::{Prompt, PromptKind, TuiState};

// poll for input from the terminal, keeps the prompt state in tuistate,
// resolves keys into input events for the session to handle
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    if ts.prompt.is_some() {
        return handle_prompt_key(code, ts);
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::PlayPress],

        // selection on the grid
        KeyCode::Left => vec![InputEvent::MoveSelection { tracks: 0, steps: -1 }],
        KeyCode::Right => vec![InputEvent::MoveSelection { tracks: 0, steps: 1 }],
        KeyCode::Up => vec![InputEvent::MoveSelection { tracks: -1, steps: 0 }],
        KeyCode::Down => vec![InputEvent::MoveSelection { tracks: 1, steps: 0 }],
        KeyCode::Enter | KeyCode::Char('x') => vec![InputEvent::ToggleSelected],
        KeyCode::Char('c') => vec![InputEvent::ClearSelectedTrack],

        // settings
        KeyCode::Char('t') => vec![InputEvent::CycleTimeSignature],
        KeyCode::Char('+') | KeyCode::Char('=') => vec![InputEvent::NudgeBpm(BPM_NUDGE)],
        KeyCode::Char('-') => vec![InputEvent::NudgeBpm(-BPM_NUDGE)],
        KeyCode::Char('m') => open_prompt(PromptKind::Setting(Field::Measures), ts),
        KeyCode::Char('s') => open_prompt(PromptKind::Setting(Field::TimeSignature), ts),
        KeyCode::Char('b') => open_prompt(PromptKind::Setting(Field::Bpm), ts),

        // samples
        KeyCode::Char('l') => open_prompt(PromptKind::SamplePath, ts),
        KeyCode::Char('r') => vec![InputEvent::RescanSamples],

        _ => vec![],
    }
}

// while a prompt is open every printable key is text
fn handle_prompt_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Enter => ts
            .prompt
            .take()
            .map(|Prompt { kind, text }| match kind {
                PromptKind::Setting(field) => InputEvent::Submit(field, text),
                PromptKind::SamplePath => InputEvent::LoadSample(text),
            })
            .into_iter()
            .collect(),
        KeyCode::Esc => {
            ts.prompt = None;
            vec![]
        }
        KeyCode::Backspace => {
            if let Some(prompt) = ts.prompt.as_mut() {
                prompt.text.pop();
            }
            vec![]
        }
        KeyCode::Char(c) if !c.is_control() => {
            if let Some(prompt) = ts.prompt.as_mut() {
                prompt.text.push(c);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn open_prompt(kind: PromptKind, ts: &mut TuiState) -> Vec<InputEvent> {
    ts.prompt = Some(Prompt::new(kind));
    vec![]
}
