use std::collections::HashMap;

use crate::audio_api::AudioCommand;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard cap so we wont malloc in audio callback
const VOICE_GAIN: f32 = 0.7;

// lives on the cpal callback thread, fed by AudioCommands
pub struct Engine {
    samples: HashMap<SampleId, SampleBuffer>,
    voices: [Option<Voice>; MAX_VOICES], // fixed pool of voices
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
            voices: [None; MAX_VOICES],
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::Trigger { sample_id } => self.trigger(sample_id),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    fn trigger(&mut self, sample_id: SampleId) {
        if !self.samples.contains_key(&sample_id) {
            return;
        }
        // free slot first, otherwise steal whichever voice has played longest
        let slot = self
            .voices
            .iter()
            .position(Option::is_none)
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, v)| v.map_or(0, |v| v.pos))
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);
        self.voices[slot] = Some(Voice::new(sample_id, VOICE_GAIN));
    }

    fn next_frame(&mut self) -> StereoFrame {
        let mut out = StereoFrame::zero();
        for slot in &mut self.voices {
            let Some(voice) = slot.as_mut() else { continue };
            let alive = self
                .samples
                .get(&voice.sample_id)
                .is_some_and(|buf| voice.render_frame(buf, &mut out));
            if !alive {
                *slot = None;
            }
        }
        out.left = out.left.clamp(-1.0, 1.0);
        out.right = out.right.clamp(-1.0, 1.0);
        out
    }

    /// Fill an interleaved device buffer of `channels` channels.
    pub fn render_block(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let mixed = self.next_frame();
            match frame {
                [mono] => *mono = (mixed.left + mixed.right) * 0.5,
                [l, r, rest @ ..] => {
                    *l = mixed.left;
                    *r = mixed.right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }
}
