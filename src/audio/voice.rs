use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

// one-shot playback of a registered sample, from the top to the end.
// drum hits never loop, never pitch, never reverse.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub sample_id: SampleId,
    pub pos: usize,
    pub gain: f32,
}

impl Voice {
    pub fn new(sample_id: SampleId, gain: f32) -> Self {
        Self { sample_id, pos: 0, gain }
    }

    // mix this voice's next frame into `out`; false once the sample has run out
    pub fn render_frame(&mut self, buffer: &SampleBuffer, out: &mut StereoFrame) -> bool {
        match buffer.data.get(self.pos) {
            Some(frame) => {
                out.add_scaled(*frame, self.gain);
                self.pos += 1;
                true
            }
            None => false,
        }
    }
}
