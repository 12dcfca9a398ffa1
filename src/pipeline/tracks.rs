// the track store: every loaded sample and the steps it plays on.
// all patterns share one length, resize is the only thing allowed to change it

use crate::audio::SampleId;
use super::error::SequencerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(pub usize);

#[derive(Clone, Debug)]
pub struct Track {
    pub sample_id: SampleId, // the engine-side buffer this row triggers
    pub name: String,
    pattern: Vec<bool>,
}

impl Track {
    pub fn pattern(&self) -> &[bool] {
        &self.pattern
    }

    pub fn is_active(&self, step: usize) -> bool {
        self.pattern.get(step).copied().unwrap_or(false)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
    total_steps: usize,
}

impl TrackStore {
    pub fn new(total_steps: usize) -> Self {
        Self { tracks: Vec::new(), total_steps }
    }

    pub fn total_steps(&self) -> usize { self.total_steps }
    pub fn len(&self) -> usize { self.tracks.len() }
    pub fn is_empty(&self) -> bool { self.tracks.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id.0)
    }

    #[cfg(test)]
    pub fn is_active(&self, id: TrackId, step: usize) -> bool {
        self.get(id).is_some_and(|t| t.is_active(step))
    }

    /// Appends a track with an empty pattern at the current grid length.
    pub fn add_track(&mut self, sample_id: SampleId, name: impl Into<String>) -> TrackId {
        self.tracks.push(Track {
            sample_id,
            name: name.into(),
            pattern: vec![false; self.total_steps],
        });
        TrackId(self.tracks.len() - 1)
    }

    pub fn toggle_step(&mut self, id: TrackId, step: usize) -> Result<bool, SequencerError> {
        let len = self.total_steps;
        let track = self.tracks.get_mut(id.0).ok_or(SequencerError::UnknownTrack(id))?;
        let cell = track
            .pattern
            .get_mut(step)
            .ok_or(SequencerError::OutOfRange { index: step, len })?;
        *cell = !*cell;
        Ok(*cell)
    }

    pub fn clear_track(&mut self, id: TrackId) -> Result<(), SequencerError> {
        let track = self.tracks.get_mut(id.0).ok_or(SequencerError::UnknownTrack(id))?;
        track.pattern.fill(false);
        Ok(())
    }

    /// Rebuilds every pattern at `new_total` steps. With `reset_all` the grid
    /// starts over empty; without it the overlapping prefix of each pattern is
    /// carried across and anything new starts off.
    pub fn resize(&mut self, new_total: usize, reset_all: bool) {
        for track in &mut self.tracks {
            let mut pattern = vec![false; new_total];
            if !reset_all {
                let keep = track.pattern.len().min(new_total);
                pattern[..keep].copy_from_slice(&track.pattern[..keep]);
            }
            track.pattern = pattern;
        }
        self.total_steps = new_total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pattern(total: usize, on: &[usize]) -> (TrackStore, TrackId) {
        let mut store = TrackStore::new(total);
        let id = store.add_track(SampleId(0), "kick.wav");
        for &step in on {
            store.toggle_step(id, step).unwrap();
        }
        (store, id)
    }

    #[test]
    fn test_add_track_matches_grid_length() {
        let mut store = TrackStore::new(32);
        let a = store.add_track(SampleId(1), "kick.wav");
        let b = store.add_track(SampleId(2), "snare.wav");
        assert_eq!(a, TrackId(0));
        assert_eq!(b, TrackId(1));
        for track in store.iter() {
            assert_eq!(track.pattern().len(), 32);
            assert!(track.pattern().iter().all(|on| !on));
        }
        assert_eq!(store.get(b).map(|t| t.name.as_str()), Some("snare.wav"));
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let (mut store, id) = store_with_pattern(16, &[3]);
        let before = store.get(id).unwrap().pattern().to_vec();
        for step in [0, 3, 15] {
            store.toggle_step(id, step).unwrap();
            store.toggle_step(id, step).unwrap();
        }
        assert_eq!(store.get(id).unwrap().pattern(), before.as_slice());
    }

    #[test]
    fn test_toggle_out_of_range() {
        let (mut store, id) = store_with_pattern(16, &[]);
        assert_eq!(
            store.toggle_step(id, 16),
            Err(SequencerError::OutOfRange { index: 16, len: 16 })
        );
        assert_eq!(
            store.toggle_step(TrackId(7), 0),
            Err(SequencerError::UnknownTrack(TrackId(7)))
        );
        assert!(store.get(id).unwrap().pattern().iter().all(|on| !on));
    }

    #[test]
    fn test_resize_preserves_prefix_when_growing() {
        let (mut store, id) = store_with_pattern(16, &[0, 5, 15]);
        store.resize(32, false);
        let pattern = store.get(id).unwrap().pattern();
        assert_eq!(pattern.len(), 32);
        for i in 0..32 {
            assert_eq!(pattern[i], matches!(i, 0 | 5 | 15), "step {i}");
        }
    }

    #[test]
    fn test_resize_preserves_prefix_when_shrinking() {
        let (mut store, id) = store_with_pattern(32, &[1, 11, 12, 31]);
        store.resize(12, false);
        let pattern = store.get(id).unwrap().pattern();
        assert_eq!(pattern.len(), 12);
        assert_eq!(store.total_steps(), 12);
        let on: Vec<usize> = (0..12).filter(|&i| pattern[i]).collect();
        assert_eq!(on, vec![1, 11]);
    }

    #[test]
    fn test_resize_reset_clears_everything() {
        let (mut store, id) = store_with_pattern(16, &[0, 1, 2, 3]);
        store.add_track(SampleId(9), "hat.wav");
        store.toggle_step(TrackId(1), 8).unwrap();
        store.resize(16, true);
        assert_eq!(store.total_steps(), 16);
        for track in store.iter() {
            assert_eq!(track.pattern().len(), 16);
            assert!(track.pattern().iter().all(|on| !on));
        }
        assert!(!store.is_active(id, 0));
    }

    #[test]
    fn test_clear_track_leaves_others() {
        let (mut store, id) = store_with_pattern(16, &[4]);
        let other = store.add_track(SampleId(3), "clap.wav");
        store.toggle_step(other, 4).unwrap();
        store.clear_track(id).unwrap();
        assert!(!store.is_active(id, 4));
        assert!(store.is_active(other, 4));
        assert_eq!(store.get(id).unwrap().pattern().len(), 16);
    }
}
