use crate::shared::DisplayState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::grid::draw_track_grid;
use super::mode::Prompt;

const HELP: &str =
    "space play/stop · arrows select · enter toggle · c clear · t/s time sig · m measures · b bpm · +/- nudge · l load · r rescan · q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, prompt: Option<&Prompt>) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // transport + grid settings
            Constraint::Min(4),    // track grid
            Constraint::Length(4), // status / prompt + help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_track_grid(frame, sections[1], state);
    draw_footer(frame, sections[2], state, prompt);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let (label, color) = if state.playing {
        ("▶ PLAYING", Color::Green)
    } else {
        ("■ STOPPED", Color::Red)
    };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "   {:.0} bpm   {}   {} measure{}   {} steps   step {}",
            state.bpm,
            state.time_signature,
            state.measures,
            if state.measures == 1 { "" } else { "s" },
            state.total_steps,
            state.cursor + 1,
        )),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" drumgrid "));
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &DisplayState, prompt: Option<&Prompt>) {
    let first = match prompt {
        Some(p) => Line::from(vec![
            Span::styled(format!("{}: ", p.kind.label()), Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}_", p.text)),
        ]),
        None => Line::from(vec![
            Span::styled(state.selected_label.clone(), Style::default().fg(Color::Cyan)),
            Span::raw("   "),
            Span::raw(state.status.clone()),
        ]),
    };
    let help = Line::styled(HELP, Style::default().fg(Color::DarkGray));
    let footer = Paragraph::new(vec![first, help]).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
