// the session: the one piece of state the ui talks to. it owns the track
// store, the grid config and the sequencer, turns ui events into direct calls
// on them, and turns whatever the sequencer fires into AudioCommands.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::audio::{DecodeError, SampleBuffer, SampleIds};
use crate::audio_api::AudioCommand;
use crate::loader::sample_loader;
use crate::pipeline::grid::{self, GridConfig, StepPosition, TimeSignature};
use crate::pipeline::{ParseError, Sequencer, SequencerError, TickOutcome, TrackId, TrackStore};
use crate::shared::{DisplayState, Field, InputEvent, TrackRow};

// only used until the output device reports its own rate
const DEFAULT_SAMPLE_RATE: u32 = 44100;

pub struct Session {
    tracks: TrackStore,
    config: GridConfig,
    sequencer: Sequencer,
    sample_ids: SampleIds,
    sample_dir: PathBuf,
    sample_rate: u32,
    loaded: HashSet<PathBuf>, // files already turned into tracks, for rescans
    selected_track: usize,
    selected_step: usize,
    last_played: Option<usize>,
    status: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl Session {
    pub fn new(config: GridConfig) -> Self {
        Self {
            tracks: TrackStore::new(config.total_steps()),
            config,
            sequencer: Sequencer::new(),
            sample_ids: SampleIds::default(),
            sample_dir: PathBuf::from("."),
            sample_rate: DEFAULT_SAMPLE_RATE,
            loaded: HashSet::new(),
            selected_track: 0,
            selected_step: 0,
            last_played: None,
            status: String::new(),
        }
    }

    /// Where typed sample paths are resolved and rescans look, and the rate
    /// samples get decoded at (the output device's).
    pub fn with_sample_source(mut self, dir: impl Into<PathBuf>, sample_rate: u32) -> Self {
        self.sample_dir = dir.into();
        self.sample_rate = sample_rate;
        self
    }

    pub fn config(&self) -> &GridConfig { &self.config }
    pub fn tracks(&self) -> &TrackStore { &self.tracks }
    pub fn cursor(&self) -> usize { self.sequencer.current_step() }
    pub fn is_playing(&self) -> bool { self.sequencer.is_running() }
    #[cfg(test)]
    pub fn status(&self) -> &str { &self.status }

    // ── samples ──────────────────────────────────────────────────

    /// Decode a sample and give it a track. On failure nothing changes.
    /// The returned command registers the buffer with the engine and has to
    /// reach it before the track's first trigger does.
    pub fn add_sample_bytes(
        &mut self,
        name: &str,
        bytes: &[u8],
        sample_rate: u32,
    ) -> Result<(TrackId, AudioCommand), DecodeError> {
        let buffer = SampleBuffer::decode_wav(bytes, sample_rate)?;
        Ok(self.add_decoded_sample(name, buffer))
    }

    pub fn add_decoded_sample(&mut self, name: &str, buffer: SampleBuffer) -> (TrackId, AudioCommand) {
        let id = self.sample_ids.allocate();
        let track = self.tracks.add_track(id, name);
        // a new sample never wipes what the other tracks already have
        self.tracks.resize(self.config.total_steps(), false);
        log::info!("loaded {name} as track {} ({} frames)", track.0, buffer.data.len());
        self.status = format!("loaded {name}");
        (track, AudioCommand::RegisterSample { id, buffer })
    }

    /// Works at any point in a session; patterns already authored on the other
    /// tracks are kept.
    pub fn load_sample(&mut self, path: &Path) -> anyhow::Result<(TrackId, AudioCommand)> {
        let (name, bytes) = match sample_loader::read(path) {
            Ok(file) => file,
            Err(e) => {
                self.status = format!("{e:#}");
                return Err(e);
            }
        };
        match self.add_sample_bytes(&name, &bytes, self.sample_rate) {
            Ok(loaded) => {
                self.loaded.insert(path.to_path_buf());
                Ok(loaded)
            }
            Err(e) => {
                self.status = format!("{name}: {e}");
                Err(e).with_context(|| format!("decoding {}", path.display()))
            }
        }
    }

    /// Load every `.wav` in the sample folder that isn't a track yet, in name
    /// order. Files that fail are logged and skipped.
    pub fn rescan_samples(&mut self) -> Vec<AudioCommand> {
        let paths = match sample_loader::index_wav_in_dir(&self.sample_dir) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("rescan: {e:#}");
                self.status = format!("{e:#}");
                return vec![];
            }
        };
        let fresh: Vec<PathBuf> = paths.into_iter().filter(|p| !self.loaded.contains(p)).collect();

        let mut cmds = Vec::new();
        for path in &fresh {
            match self.load_sample(path) {
                Ok((_, cmd)) => cmds.push(cmd),
                Err(e) => log::warn!("skipping {}: {e:#}", path.display()),
            }
        }
        log::info!("{} of {} new samples loaded from {}", cmds.len(), fresh.len(), self.sample_dir.display());
        self.status = match fresh.len() - cmds.len() {
            0 => format!("{} new samples loaded", cmds.len()),
            failed => format!("{} new samples loaded, {failed} skipped", cmds.len()),
        };
        cmds
    }

    // ── pattern editing ──────────────────────────────────────────

    pub fn toggle_step(&mut self, track: TrackId, step: usize) -> Result<bool, SequencerError> {
        self.tracks.toggle_step(track, step)
    }

    pub fn clear_track(&mut self, track: TrackId) -> Result<(), SequencerError> {
        self.tracks.clear_track(track)
    }

    // ── grid + tempo ─────────────────────────────────────────────

    pub fn set_measures(&mut self, measures: u32) -> Result<(), ParseError> {
        self.config.set_measures(measures)?;
        self.regrid();
        Ok(())
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) -> Result<(), ParseError> {
        self.config.set_time_signature(time_signature)?;
        self.regrid();
        Ok(())
    }

    // tempo doesn't touch the grid, the next tick just picks it up
    pub fn set_bpm(&mut self, bpm: f32) -> Result<(), ParseError> {
        self.config.set_bpm(bpm)?;
        log::info!("bpm set to {bpm}");
        Ok(())
    }

    /// Parse and apply a value typed into one of the settings prompts. A value
    /// that doesn't parse leaves the current configuration alone.
    pub fn apply_text(&mut self, field: Field, text: &str) -> Result<(), ParseError> {
        match field {
            Field::Measures => self.set_measures(grid::parse_measures(text)?),
            Field::TimeSignature => self.set_time_signature(text.parse()?),
            Field::Bpm => self.set_bpm(grid::parse_bpm(text)?),
        }
    }

    // an explicit grid change starts every pattern over
    fn regrid(&mut self) {
        let total = self.config.total_steps();
        self.tracks.resize(total, true);
        self.sequencer.clamp_cursor(total);
        self.selected_step = self.selected_step.min(total.saturating_sub(1));
        if self.last_played.is_some_and(|s| s >= total) {
            self.last_played = None;
        }
        log::info!(
            "grid is now {} x {} ({} steps), patterns cleared",
            self.config.measures(),
            self.config.time_signature(),
            total
        );
    }

    // ── transport ────────────────────────────────────────────────

    pub fn start(&mut self, now: Instant) -> Vec<AudioCommand> {
        let outcome = self.sequencer.start(now, &self.tracks, &self.config);
        self.dispatch(outcome)
    }

    pub fn stop(&mut self) {
        self.sequencer.stop();
        self.last_played = None;
    }

    pub fn toggle_playback(&mut self, now: Instant) -> Vec<AudioCommand> {
        if self.is_playing() {
            self.stop();
            vec![]
        } else {
            self.start(now)
        }
    }

    pub fn poll(&mut self, now: Instant) -> Vec<AudioCommand> {
        let outcome = self.sequencer.poll(now, &self.tracks, &self.config);
        self.dispatch(outcome)
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.sequencer.time_until_next_tick(now)
    }

    fn dispatch(&mut self, outcome: Option<TickOutcome>) -> Vec<AudioCommand> {
        let Some(outcome) = outcome else { return vec![] };
        self.last_played = Some(outcome.step);
        outcome
            .triggered
            .into_iter()
            .map(|sample_id| AudioCommand::Trigger { sample_id })
            .collect()
    }

    // ── ui ───────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> Vec<AudioCommand> {
        match event {
            InputEvent::Quit => vec![],
            InputEvent::PlayPress => self.toggle_playback(now),
            InputEvent::MoveSelection { tracks, steps } => {
                self.move_selection(tracks, steps);
                vec![]
            }
            InputEvent::ToggleSelected => {
                let result = self.toggle_step(TrackId(self.selected_track), self.selected_step);
                if let Err(e) = result {
                    self.report(e);
                }
                vec![]
            }
            InputEvent::ClearSelectedTrack => {
                if let Err(e) = self.clear_track(TrackId(self.selected_track)) {
                    self.report(e);
                }
                vec![]
            }
            InputEvent::CycleTimeSignature => {
                let next = self.config.time_signature().next_preset();
                if let Err(e) = self.set_time_signature(next) {
                    self.report(e);
                }
                vec![]
            }
            InputEvent::NudgeBpm(delta) => {
                let bpm = (self.config.bpm() + delta).round();
                if let Err(e) = self.set_bpm(bpm) {
                    self.report(e);
                }
                vec![]
            }
            InputEvent::RescanSamples => self.rescan_samples(),
            InputEvent::LoadSample(text) => {
                let path = self.sample_dir.join(text.trim());
                match self.load_sample(&path) {
                    Ok((_, cmd)) => vec![cmd],
                    Err(e) => {
                        log::warn!("could not load {}: {e:#}", path.display());
                        vec![]
                    }
                }
            }
            InputEvent::Submit(field, text) => {
                match self.apply_text(field, &text) {
                    Ok(()) => self.status = format!("{} set to {}", field.label(), text.trim()),
                    Err(e) => self.report(e),
                }
                vec![]
            }
        }
    }

    fn report(&mut self, err: impl Into<SequencerError>) {
        let err = err.into();
        log::warn!("rejected: {err}");
        self.status = err.to_string();
    }

    fn move_selection(&mut self, tracks: isize, steps: isize) {
        let wrap = |pos: usize, delta: isize, len: usize| -> usize {
            if len == 0 {
                return 0;
            }
            (pos as isize + delta).rem_euclid(len as isize) as usize
        };
        self.selected_track = wrap(self.selected_track, tracks, self.tracks.len());
        self.selected_step = wrap(self.selected_step, steps, self.config.total_steps());
    }

    pub fn display_state(&self) -> DisplayState {
        let beats = self.config.time_signature().beats;
        DisplayState {
            rows: self
                .tracks
                .iter()
                .map(|t| TrackRow { name: t.name.clone(), steps: t.pattern().to_vec() })
                .collect(),
            playing: self.is_playing(),
            playing_step: self.last_played.filter(|_| self.is_playing()),
            cursor: self.cursor(),
            selected_track: self.selected_track,
            selected_step: self.selected_step,
            selected_label: StepPosition::of(self.selected_step, beats).to_string(),
            measures: self.config.measures(),
            time_signature: self.config.time_signature().to_string(),
            beats_per_measure: beats,
            bpm: self.config.bpm(),
            total_steps: self.config.total_steps(),
            status: self.status.clone(),
        }
    }
}
