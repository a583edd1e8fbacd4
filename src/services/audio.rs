//! Alert playback service
//!
//! Runs in a background task, receiving [`AlertRequest`]s via channel. The
//! engine side only ever calls `try_send`, so a slow or broken sound device
//! can never hold up a tick. With the `audio` feature (on by default), files
//! and tones go to the default output device through rodio. Headless builds
//! ring the terminal bell: once for a threshold alert, three times at expiry.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{AlertKind, AlertRequest, AlertSink, AlertSound};

/// Sender handle for alert playback requests
pub type AudioSender = mpsc::Sender<AlertRequest>;

/// Create a new audio channel
pub fn create_audio_channel() -> (AudioSender, mpsc::Receiver<AlertRequest>) {
    // A handful of alerts per second at most
    mpsc::channel(16)
}

impl AlertSink for AudioSender {
    fn dispatch(&self, request: AlertRequest) {
        if let Err(e) = self.try_send(request) {
            warn!("Dropping alert, audio service unavailable: {}", e);
        }
    }
}

/// Audio service that plays alert sounds
pub struct AudioService {
    event_rx: mpsc::Receiver<AlertRequest>,
}

impl AudioService {
    pub fn new(event_rx: mpsc::Receiver<AlertRequest>) -> Self {
        Self { event_rx }
    }

    /// Run until every sender is dropped
    pub async fn run(mut self) {
        while let Some(request) = self.event_rx.recv().await {
            debug!("Playing {:?} alert: {:?}", request.kind, request.sound);
            play(request);
        }
        debug!("Audio service stopped");
    }
}

#[cfg(feature = "audio")]
fn play(request: AlertRequest) {
    // Playback blocks until the sound ends, keep it off the runtime
    std::thread::spawn(move || {
        if let Err(e) = play_blocking(&request.sound) {
            warn!("{:?} alert playback failed for {:?}: {}", request.kind, request.sound, e);
        }
    });
}

#[cfg(feature = "audio")]
fn play_blocking(sound: &AlertSound) -> Result<(), String> {
    use std::{fs::File, io::BufReader};

    use rodio::{source::SineWave, Decoder, OutputStream, Sink, Source};

    let (_stream, stream_handle) =
        OutputStream::try_default().map_err(|e| format!("no output device: {}", e))?;
    let sink = Sink::try_new(&stream_handle).map_err(|e| format!("cannot open sink: {}", e))?;

    match sound {
        AlertSound::File(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
            let source = Decoder::new(BufReader::new(file))
                .map_err(|e| format!("cannot decode {}: {}", path.display(), e))?;
            sink.append(source);
        }
        AlertSound::Tone {
            frequency_hz,
            duration,
        } => {
            let tone = SineWave::new(*frequency_hz as f32)
                .take_duration(*duration)
                .amplify(0.25);
            sink.append(tone);
        }
    }

    sink.sleep_until_end();
    Ok(())
}

/// Bell pattern used when there is no audio output
#[cfg_attr(feature = "audio", allow(dead_code))]
fn bell_pattern(kind: AlertKind) -> &'static [u8] {
    match kind {
        AlertKind::Threshold => b"\x07",
        AlertKind::Terminal => b"\x07\x07\x07",
    }
}

#[cfg(not(feature = "audio"))]
fn play(request: AlertRequest) {
    use std::io::Write;

    if let AlertSound::File(path) = &request.sound {
        debug!("Built without audio output, ringing bell instead of {}", path.display());
    }
    let mut stderr = std::io::stderr();
    let bells = bell_pattern(request.kind);
    if let Err(e) = stderr.write_all(bells).and_then(|_| stderr.flush()) {
        warn!("Alert playback failed: {}", e);
    }
}
