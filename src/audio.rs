//! Sound requests
//!
//! The simulation never plays audio. Each tick it queues `AudioRequest`s and
//! the host drains them through an `AudioManager`, which applies the volume
//! policy and hands the result to whatever `SoundSink` actually makes noise.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    /// Body hits an arena wall or an obstacle side
    WallImpact,
    /// Body lands on the floor or on top of an obstacle
    PlatformImpact,
    Jump,
    DoubleJump,
    /// Two bodies bump, a missile hits, an enemy breaks
    BallCollision,
    LifeLost,
}

/// "Play sound K at intensity I"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioRequest {
    pub kind: SoundKind,
    /// Playback intensity in [0, 1]
    pub intensity: f32,
}

impl AudioRequest {
    /// Build a request, clamping intensity into [0, 1]
    pub fn new(kind: SoundKind, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { kind, intensity }
    }
}

/// Something that can actually play a precomputed waveform
pub trait SoundSink {
    fn play(&mut self, kind: SoundKind, volume: f32);
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink {
    pub played: u64,
}

impl SoundSink for LogSink {
    fn play(&mut self, kind: SoundKind, volume: f32) {
        self.played += 1;
        log::trace!("sound {:?} at {:.2}", kind, volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: SoundSink> {
    sink: S,
    enabled: bool,
    master_volume: f32,
    muted: bool,
}

impl<S: SoundSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            enabled: true,
            master_volume: 0.7,
            muted: false,
        }
    }

    /// Disabled managers silently drop every request
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted || !self.enabled {
            0.0
        } else {
            self.master_volume
        }
    }

    /// Play a single request
    pub fn play(&mut self, request: AudioRequest) {
        let vol = self.effective_volume() * request.intensity;
        if vol <= 0.0 {
            return;
        }
        self.sink.play(request.kind, vol);
    }

    /// Play everything the simulation queued this tick
    pub fn play_all(&mut self, requests: impl IntoIterator<Item = AudioRequest>) {
        for request in requests {
            self.play(request);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
