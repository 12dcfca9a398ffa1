// the step clock. nothing in here sleeps or spawns: the host loop calls
// `poll` with the current time, and the pending deadline inside
// `Transport::Running` is the only "timer" there is. dropping it cancels.

use std::time::{Duration, Instant};

use crate::audio::SampleId;
use super::grid::GridConfig;
use super::tracks::TrackStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    Running { next_tick: Instant },
}

/// What one tick did: which step it read, which samples it asked to play,
/// and how long until the next one.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    pub step: usize,
    pub triggered: Vec<SampleId>,
    pub delay: Duration,
}

#[derive(Clone, Debug)]
pub struct Sequencer {
    current_step: usize,
    transport: Transport,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self { current_step: 0, transport: Transport::Stopped }
    }

    pub fn current_step(&self) -> usize { self.current_step }
    #[cfg(test)]
    pub fn transport(&self) -> Transport { self.transport }

    pub fn is_running(&self) -> bool {
        matches!(self.transport, Transport::Running { .. })
    }

    /// Stopped -> Running. Ticks once right away and arms the next tick.
    /// Returns `None` (and changes nothing) when already running, so there is
    /// never more than one pending tick.
    pub fn start(&mut self, now: Instant, tracks: &TrackStore, config: &GridConfig) -> Option<TickOutcome> {
        if self.is_running() {
            return None;
        }
        log::debug!("transport: start at step {}", self.current_step);
        let outcome = self.tick(tracks, config);
        self.arm(now, outcome.delay);
        Some(outcome)
    }

    fn arm(&mut self, now: Instant, delay: Duration) {
        // an unrepresentable deadline means tick again on the next poll
        let next_tick = now.checked_add(delay).unwrap_or(now);
        self.transport = Transport::Running { next_tick };
    }

    /// Running -> Stopped. The pending tick is dropped with the deadline; the
    /// cursor stays where it is so the next `start` resumes from it.
    pub fn stop(&mut self) {
        if self.is_running() {
            log::debug!("transport: stop at step {}", self.current_step);
        }
        self.transport = Transport::Stopped;
    }

    /// Fires the pending tick if its deadline has passed. The next deadline is
    /// measured from `now`, so a late poll costs one late step rather than a
    /// burst of catch-up steps.
    pub fn poll(&mut self, now: Instant, tracks: &TrackStore, config: &GridConfig) -> Option<TickOutcome> {
        match self.transport {
            Transport::Running { next_tick } if now >= next_tick => {
                let outcome = self.tick(tracks, config);
                self.arm(now, outcome.delay);
                Some(outcome)
            }
            _ => None,
        }
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        match self.transport {
            Transport::Running { next_tick } => Some(next_tick.saturating_duration_since(now)),
            Transport::Stopped => None,
        }
    }

    /// One step: collect every track active at the cursor, then advance.
    /// Grid length and tempo are read from `config` every time so changes land
    /// on the very next tick.
    pub fn tick(&mut self, tracks: &TrackStore, config: &GridConfig) -> TickOutcome {
        let total = config.total_steps().max(1);
        // resize keeps this in range; this only matters if someone skipped it
        if self.current_step >= total {
            self.current_step = 0;
        }
        let step = self.current_step;

        let triggered = tracks
            .iter()
            .filter(|t| t.is_active(step))
            .map(|t| t.sample_id)
            .collect();

        self.current_step = (step + 1) % total;
        TickOutcome { step, triggered, delay: config.step_interval() }
    }

    /// Called whenever the grid length changes. A cursor that no longer fits
    /// goes back to the top of the pattern.
    pub fn clamp_cursor(&mut self, total_steps: usize) {
        if self.current_step >= total_steps.max(1) {
            log::debug!(
                "cursor {} past new grid length {}, back to 0",
                self.current_step, total_steps
            );
            self.current_step = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::grid::{TimeSignature, step_interval};
    use crate::shared::{MAX_BPM, MIN_BPM};

    fn two_bars_of_four() -> GridConfig {
        GridConfig::new(2, TimeSignature::COMMON, 120.0).unwrap()
    }

    #[test]
    fn test_single_trigger_in_sixteen_ticks() {
        let config = two_bars_of_four();
        assert_eq!(config.total_steps(), 32);
        let mut tracks = TrackStore::new(config.total_steps());
        let kick = tracks.add_track(SampleId(1), "kick.wav");
        tracks.toggle_step(kick, 0).unwrap();
        tracks.toggle_step(kick, 16).unwrap();

        let mut seq = Sequencer::new();
        let fired: usize = (0..16).map(|_| seq.tick(&tracks, &config).triggered.len()).sum();
        assert_eq!(fired, 1);
        assert_eq!(seq.current_step(), 16);
        assert_eq!(seq.tick(&tracks, &config).triggered, vec![SampleId(1)]);
    }

    #[test]
    fn test_cursor_wraps_after_total_steps() {
        let config = GridConfig::new(1, "3/4".parse().unwrap(), 90.0).unwrap();
        let tracks = TrackStore::new(config.total_steps());
        let mut seq = Sequencer::new();
        for _ in 0..5 {
            seq.tick(&tracks, &config);
        }
        let start = seq.current_step();
        for _ in 0..config.total_steps() {
            seq.tick(&tracks, &config);
        }
        assert_eq!(seq.current_step(), start);
    }

    #[test]
    fn test_tick_delay_follows_live_tempo() {
        let mut config = two_bars_of_four();
        let tracks = TrackStore::new(config.total_steps());
        let mut seq = Sequencer::new();
        assert_eq!(seq.tick(&tracks, &config).delay, Duration::from_millis(125));
        config.set_bpm(60.0).unwrap();
        assert_eq!(seq.tick(&tracks, &config).delay, Duration::from_millis(250));
    }

    #[test]
    fn test_start_twice_is_idempotent() {
        let config = two_bars_of_four();
        let tracks = TrackStore::new(config.total_steps());
        let t0 = Instant::now();
        let mut seq = Sequencer::new();

        let first = seq.start(t0, &tracks, &config).unwrap();
        assert_eq!(first.step, 0);
        assert!(seq.start(t0, &tracks, &config).is_none());
        assert_eq!(seq.current_step(), 1);
        assert_eq!(
            seq.transport(),
            Transport::Running { next_tick: t0 + Duration::from_millis(125) }
        );
    }

    #[test]
    fn test_stop_then_start_resumes_cursor() {
        let config = two_bars_of_four();
        let tracks = TrackStore::new(config.total_steps());
        let t0 = Instant::now();
        let mut seq = Sequencer::new();

        seq.start(t0, &tracks, &config);
        let mut now = t0;
        for _ in 0..4 {
            now += Duration::from_millis(125);
            assert!(seq.poll(now, &tracks, &config).is_some());
        }
        assert_eq!(seq.current_step(), 5);

        seq.stop();
        seq.stop();
        assert!(!seq.is_running());
        // nothing fires while stopped, however late it gets
        assert!(seq.poll(now + Duration::from_secs(10), &tracks, &config).is_none());

        let resumed = seq.start(now, &tracks, &config).unwrap();
        assert_eq!(resumed.step, 5);
    }

    #[test]
    fn test_poll_waits_for_deadline_and_never_bursts() {
        let config = two_bars_of_four();
        let tracks = TrackStore::new(config.total_steps());
        let t0 = Instant::now();
        let mut seq = Sequencer::new();
        seq.start(t0, &tracks, &config);

        assert!(seq.poll(t0 + Duration::from_millis(100), &tracks, &config).is_none());
        assert_eq!(
            seq.time_until_next_tick(t0 + Duration::from_millis(100)),
            Some(Duration::from_millis(25))
        );

        // a full second late: one tick, then wait a fresh interval from now
        let late = t0 + Duration::from_secs(1);
        assert!(seq.poll(late, &tracks, &config).is_some());
        assert!(seq.poll(late, &tracks, &config).is_none());
        assert_eq!(seq.current_step(), 2);
        assert_eq!(seq.time_until_next_tick(late), Some(Duration::from_millis(125)));
    }

    #[test]
    fn test_clamp_cursor_on_shrink() {
        let config = two_bars_of_four();
        let tracks = TrackStore::new(config.total_steps());
        let mut seq = Sequencer::new();
        for _ in 0..20 {
            seq.tick(&tracks, &config);
        }
        seq.clamp_cursor(32);
        assert_eq!(seq.current_step(), 20);
        seq.clamp_cursor(16);
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn test_tick_guards_stale_cursor() {
        let mut config = two_bars_of_four();
        let mut tracks = TrackStore::new(config.total_steps());
        let id = tracks.add_track(SampleId(4), "rim.wav");
        let mut seq = Sequencer::new();
        for _ in 0..20 {
            seq.tick(&tracks, &config);
        }
        config.set_measures(1).unwrap();
        tracks.resize(config.total_steps(), true);
        tracks.toggle_step(id, 0).unwrap();
        let outcome = seq.tick(&tracks, &config);
        assert_eq!(outcome.step, 0);
        assert_eq!(outcome.triggered, vec![SampleId(4)]);
    }

    #[test]
    fn test_slowest_and_fastest_tempo_arm_a_deadline() {
        let tracks = TrackStore::new(16);
        let t0 = Instant::now();
        for (bpm, interval) in [(MIN_BPM, Duration::from_secs(15)), (MAX_BPM, step_interval(MAX_BPM))] {
            let config = GridConfig::new(1, TimeSignature::COMMON, bpm).unwrap();
            let mut seq = Sequencer::new();
            let outcome = seq.start(t0, &tracks, &config).unwrap();
            assert_eq!(outcome.delay, interval);
            assert_eq!(seq.time_until_next_tick(t0), Some(interval));
        }
    }
}
