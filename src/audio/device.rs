//! Speaker output through the default cpal device

use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use tracing::{debug, error, info, warn};

use super::backend::{load_decoded, AudioBackend, AudioError, TrackHandle};
use super::decode::Pcm;

/// A running output stream, owned by its own thread
struct Playback {
    handle: TrackHandle,
    stop_tx: std_mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

/// Plays decoded tracks on the default output device
pub struct DeviceBackend {
    current: Option<Playback>,
}

impl DeviceBackend {
    /// Fails when the host has no output device
    pub fn new() -> Result<Self, AudioError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoOutput)?;

        debug!(
            device = device.name().unwrap_or_default(),
            "audio output initialized"
        );
        Ok(Self { current: None })
    }
}

impl AudioBackend for DeviceBackend {
    fn load_track(&mut self, path: &std::path::Path) -> Result<TrackHandle, AudioError> {
        load_decoded(path)
    }

    fn play(&mut self, handle: &TrackHandle, looped: bool) -> Result<(), AudioError> {
        self.stop();

        let pcm = handle
            .pcm()
            .cloned()
            .ok_or_else(|| AudioError::Backend("track was not decoded".to_string()))?;

        let (ready_tx, ready_rx) = std_mpsc::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

        // cpal streams are not Send, so the stream lives on its own thread
        let thread = thread::Builder::new()
            .name("voicehome-playback".to_string())
            .spawn(move || match open_stream(pcm, looped) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    // Returns on stop() or when the backend is dropped
                    let _ = stop_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| AudioError::Backend(format!("failed to spawn playback thread: {e}")))?;

        let started = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(AudioError::Backend("playback thread exited".to_string())));

        match started {
            Ok(()) => {
                info!(path = ?handle.path(), looped, "playback started");
                self.current = Some(Playback {
                    handle: handle.clone(),
                    stop_tx,
                    thread,
                });
                Ok(())
            }
            Err(e) => {
                let _ = thread.join();
                Err(e)
            }
        }
    }

    fn stop(&mut self) {
        let Some(playback) = self.current.take() else {
            return;
        };

        let _ = playback.stop_tx.send(());
        if playback.thread.join().is_err() {
            warn!("playback thread panicked");
        }
        info!(path = ?playback.handle.path(), "playback stopped");
    }
}

impl Drop for DeviceBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn backend_error(e: impl std::fmt::Display) -> AudioError {
    AudioError::Backend(e.to_string())
}

/// Open the default device at the track's native layout and start it
fn open_stream(pcm: Arc<Pcm>, looped: bool) -> Result<cpal::Stream, AudioError> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoOutput)?;

    let rate = SampleRate(pcm.sample_rate);
    let supported = device
        .supported_output_configs()
        .map_err(backend_error)?
        .any(|c| {
            c.channels() == pcm.channels && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate
        });
    if !supported {
        return Err(AudioError::Backend(format!(
            "output device cannot play {} Hz audio with {} channels",
            pcm.sample_rate, pcm.channels
        )));
    }

    let config = StreamConfig {
        channels: pcm.channels,
        sample_rate: rate,
        buffer_size: BufferSize::Default,
    };

    let mut position = 0usize;
    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for out in data.iter_mut() {
                    if position >= pcm.samples.len() {
                        if !looped {
                            *out = 0.0;
                            continue;
                        }
                        position = 0;
                    }
                    *out = pcm.samples[position];
                    position += 1;
                }
            },
            |err| error!(error = %err, "audio output error"),
            None,
        )
        .map_err(backend_error)?;

    stream.play().map_err(backend_error)?;
    Ok(stream)
}
