//! Decoding of playlist files into PCM samples

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use super::backend::AudioError;

/// Decoded audio, interleaved `f32` samples in `[-1.0, 1.0]`
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl Pcm {
    /// Playing time at the native rate
    pub fn duration_secs(&self) -> f32 {
        let frames = self.samples.len() / usize::from(self.channels.max(1));
        frames as f32 / self.sample_rate.max(1) as f32
    }
}

/// Decode an audio file, choosing the decoder by extension
pub fn decode_file(path: &Path) -> Result<Pcm, AudioError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let pcm = match ext.as_deref() {
        Some("mp3") => decode_mp3(path)?,
        Some("wav") => decode_wav(path)?,
        _ => return Err(AudioError::UnsupportedFormat(path.to_owned())),
    };

    if pcm.samples.is_empty() {
        return Err(AudioError::Backend(format!(
            "no audio frames in {}",
            path.display()
        )));
    }

    debug!(
        ?path,
        channels = pcm.channels,
        sample_rate = pcm.sample_rate,
        secs = pcm.duration_secs(),
        "track decoded"
    );
    Ok(pcm)
}

fn decode_mp3(path: &Path) -> Result<Pcm, AudioError> {
    let file = File::open(path).map_err(|_| AudioError::NotFound(path.to_owned()))?;
    let mut decoder = minimp3::Decoder::new(BufReader::new(file));

    let mut samples = Vec::new();
    let mut channels = 0u16;
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                // Frames with a different layout than the first are dropped
                let frame_channels = u16::try_from(frame.channels).unwrap_or(0);
                let frame_rate = u32::try_from(frame.sample_rate).unwrap_or(0);
                if channels == 0 {
                    channels = frame_channels;
                    sample_rate = frame_rate;
                }
                if frame_channels != channels || frame_rate != sample_rate {
                    continue;
                }
                samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(AudioError::Backend(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(Pcm {
        samples,
        channels,
        sample_rate,
    })
}

fn decode_wav(path: &Path) -> Result<Pcm, AudioError> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| AudioError::Backend(format!("WAV decode error: {e}")))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1).min(31)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| AudioError::Backend(format!("WAV decode error: {e}")))?;

    Ok(Pcm {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write a short 8 kHz mono WAV file
#[cfg(test)]
pub(crate) fn write_tone(path: &Path, frames: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let sample = if i % 2 == 0 { i16::MAX } else { i16::MIN };
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}
