use std::io::Cursor;

use super::frame::StereoFrame;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a readable WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported sample format: {bits}-bit {format:?}")]
    UnsupportedFormat { format: hound::SampleFormat, bits: u16 },

    #[error("sample contains no audio")]
    Empty,
}

#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // at the engine's sample rate
}

impl SampleBuffer {
    /// Decode an in-memory WAV file, folding it to stereo and resampling it to
    /// `target_rate`.
    pub fn decode_wav(bytes: &[u8], target_rate: u32) -> Result<Self, DecodeError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int if (1..=32).contains(&spec.bits_per_sample) => {
                // ints come back sign-extended, scale by the format's full range
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
            format => {
                return Err(DecodeError::UnsupportedFormat { format, bits: spec.bits_per_sample });
            }
        };

        // mono is duplicated, anything past two channels is dropped
        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| match c {
                [x] => StereoFrame::mono(*x),
                [l, r, ..] => StereoFrame { left: *l, right: *r },
                [] => StereoFrame::zero(),
            })
            .collect();

        if frames.is_empty() {
            return Err(DecodeError::Empty);
        }

        Ok(Self { data: resample_linear(&frames, spec.sample_rate, target_rate) })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 || target_rate == 0 {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.last().copied().unwrap_or_default();

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx + 1 >= frames.len() {
                last
            } else {
                StereoFrame::lerp(frames[idx], frames[idx + 1], (src_pos - idx as f64) as f32)
            }
        })
        .collect()
}
