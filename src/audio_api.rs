pub use crate::audio::{SampleBuffer, SampleId};

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // Decoding happens off the audio thread (see sample_loader.rs); the
    // finished buffer is handed over once, then referred to by id
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // Start the sample from the top right now. Fire and forget.
    Trigger { sample_id: SampleId },
}

impl AudioCommand {
    pub fn label(&self) -> String {
        match self {
            AudioCommand::RegisterSample { id, buffer } => {
                format!("register {:?} ({} frames)", id, buffer.data.len())
            }
            AudioCommand::Trigger { sample_id } => format!("trigger {:?}", sample_id),
        }
    }
}
