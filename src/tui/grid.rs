use crate::pipeline::StepPosition;
use crate::shared::DisplayState;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const NAME_WIDTH: usize = 14;
const ON: &str = "●";
const OFF: &str = "·";

// one row per track, one glyph per step. beats are split by a space and
// measures by a bar, like the beat/measure-start marks on a drum grid
pub fn draw_track_grid(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let block = Block::default().borders(Borders::ALL).title(" tracks ");

    if state.rows.is_empty() {
        let hint = Paragraph::new("no .wav samples loaded; put some in the project folder and restart")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let mut lines = vec![playhead_line(state)];
    for (row_idx, row) in state.rows.iter().enumerate() {
        let selected_row = row_idx == state.selected_track;
        let name_style = if selected_row {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mut spans = vec![Span::styled(fit_name(&row.name), name_style)];

        for (step, &on) in row.steps.iter().enumerate() {
            spans.push(Span::raw(step_separator(step, state.beats_per_measure)));
            let mut style = if on {
                Style::default().fg(Color::LightMagenta)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            if state.playing_step == Some(step) {
                style = style.bg(Color::Rgb(60, 60, 20));
            }
            if selected_row && step == state.selected_step {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(if on { ON } else { OFF }, style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn playhead_line(state: &DisplayState) -> Line<'static> {
    let mut text = " ".repeat(NAME_WIDTH);
    for step in 0..state.total_steps {
        text.push_str(step_separator(step, state.beats_per_measure));
        text.push(if state.playing_step == Some(step) { '▼' } else { ' ' });
    }
    Line::styled(text, Style::default().fg(Color::Yellow))
}

pub fn step_separator(step: usize, beats_per_measure: u32) -> &'static str {
    if step == 0 {
        return "";
    }
    let pos = StepPosition::of(step, beats_per_measure);
    if pos.is_measure_start() {
        "│"
    } else if pos.is_beat_start() {
        " "
    } else {
        ""
    }
}

fn fit_name(name: &str) -> String {
    let mut fitted: String = name.chars().take(NAME_WIDTH - 1).collect();
    while fitted.chars().count() < NAME_WIDTH {
        fitted.push(' ');
    }
    fitted
}
