// the sequencing core: grid sizing, the track store, and the step clock.
// no audio, terminal or filesystem access below here except settings.rs

pub mod error;
pub mod grid;
pub mod sequencer;
pub mod settings;
pub mod tracks;

pub use error::{ParseError, SequencerError};
pub use grid::{GridConfig, StepPosition, TimeSignature};
pub use sequencer::{Sequencer, TickOutcome};
pub use tracks::{Track, TrackId, TrackStore};
