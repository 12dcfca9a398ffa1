// error kinds surfaced by the sequencing core; none of them are fatal

use super::tracks::TrackId;

// user text that could not be turned into a grid/tempo setting.
// the previous configuration stays active when one of these comes back
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("time signature must look like N/M, got {0:?}")]
    MalformedTimeSignature(String),

    #[error("time signature needs at least one beat per measure")]
    ZeroBeats,

    #[error("{field} must be a number, got {input:?}")]
    NotANumber { field: &'static str, input: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequencerError {
    #[error("step {index} is out of range for a {len}-step grid")]
    OutOfRange { index: usize, len: usize },

    #[error("no track with id {0:?}")]
    UnknownTrack(TrackId),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
