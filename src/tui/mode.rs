use crate::shared::Field;

// state local to the tui: an open text prompt, if any.
// everything the sequencer cares about lives in the session instead
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub prompt: Option<Prompt>,
}

// what the typed text is for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Setting(Field),
    SamplePath,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Setting(field) => field.label(),
            PromptKind::SamplePath => "load sample",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self { kind, text: String::new() }
    }
}
