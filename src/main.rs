mod shared;
mod tui;
mod audio_api;
mod audio;
mod loader;
mod logging;
mod middle;
mod pipeline;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use middle::Session;
use pipeline::settings::{self, Settings};
use shared::InputEvent;

const FRAME_INTERVAL: Duration = Duration::from_millis(16); // ~60fps

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let log_path = logging::init(&project_dir)?;
    log::info!("drumgrid starting in {} (log: {})", project_dir.display(), log_path.display());

    let settings = settings::load_settings(&project_dir).unwrap_or_else(|e| {
        log::warn!("{e:#}, using default settings");
        Settings::default()
    });

    let audio = audio::start_audio()?;
    let mut session = Session::new(settings.to_config())
        .with_sample_source(project_dir.clone(), audio.sample_rate());

    // startup load is just the first rescan; `r` picks up files added later
    for cmd in session.rescan_samples() {
        audio.send(cmd);
    }
    if session.tracks().is_empty() {
        log::warn!("no samples in {}, press l to load one", project_dir.display());
    }

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = session.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, tui_state.prompt.as_ref());
        })?;

        // never wait past the next step, that's the only place a tick can run
        let timeout = session
            .time_until_next_tick(Instant::now())
            .map_or(FRAME_INTERVAL, |d| d.min(FRAME_INTERVAL));

        let events = tui::input::poll_input(timeout, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                // grid + tempo survive a restart, patterns don't
                if let Err(e) = settings::save_settings(&project_dir, &Settings::from_config(session.config())) {
                    log::warn!("could not save settings: {e:#}");
                }
                log::info!("drumgrid quitting");
                return Ok(());
            }
            for cmd in session.handle_input(event, Instant::now()) {
                audio.send(cmd);
            }
        }

        for cmd in session.poll(Instant::now()) {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
