// Keys (resolved by the tui into InputEvents):
//
//   arrows        //  move the selected cell (left/right = step, up/down = track)
//   Enter / x     //  ToggleSelected
//   Space         //  PlayPress
//   c             //  ClearSelectedTrack
//   t             //  CycleTimeSignature
//   + / -         //  NudgeBpm(+1 / -1)
//   m / s / b     //  open a prompt for measures / time signature / bpm,
//                 //  Enter submits it as Submit(field, text), Esc drops it
//   l             //  prompt for a .wav path, Enter sends LoadSample(text)
//   r             //  RescanSamples: load any .wav in the folder not loaded yet
//   q / Esc       //  Quit
//
// Rendering works like it always has: the session owns every bit of sequencer
// state, and each frame the tui asks it for a DisplayState and draws that.

pub const STEPS_PER_BEAT: usize = 4; // sixteenth notes
pub const DEFAULT_BPM: f32 = 120.0;
pub const BPM_NUDGE: f32 = 1.0;

// input limits; anything past these is refused before it reaches the grid
pub const MIN_BPM: f32 = 1.0;
pub const MAX_BPM: f32 = 999.0;
pub const MAX_MEASURES: u32 = 64;
pub const MAX_BEATS: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Measures,
    TimeSignature,
    Bpm,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Measures => "measures",
            Field::TimeSignature => "time signature",
            Field::Bpm => "bpm",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    PlayPress,
    MoveSelection { tracks: isize, steps: isize },
    ToggleSelected,
    ClearSelectedTrack,
    CycleTimeSignature,
    NudgeBpm(f32),
    RescanSamples,
    Submit(Field, String), // text typed into a prompt, not yet validated
    LoadSample(String),    // a path typed into the sample prompt
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackRow {
    pub name: String,
    pub steps: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub rows: Vec<TrackRow>,
    pub playing: bool,
    pub playing_step: Option<usize>, // the step the last tick played, while running
    pub cursor: usize,               // the step the next tick will play
    pub selected_track: usize,
    pub selected_step: usize,
    pub selected_label: String, // "measure 1, beat 2, step 3"
    pub measures: u32,
    pub time_signature: String,
    pub beats_per_measure: u32,
    pub bpm: f32,
    pub total_steps: usize,
    pub status: String,
}
