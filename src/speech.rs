//! Fire-and-forget speech playback bookkeeping. Playback never blocks a state
//! transition, repeat requests are ignored while a clip is in flight, and a
//! missing audio backend degrades to the control simply staying disabled.

use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

pub const SAMPLE_RATE_HZ: u32 = 24_000;
const BYTES_PER_SAMPLE: u32 = 2;

pub struct SpeechPlayer {
    playing: Arc<AtomicBool>,
}

impl SpeechPlayer {
    pub fn new() -> Self {
        Self {
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Start playing a raw 24 kHz mono s16le clip. Returns false (and does
    /// nothing) when a clip is already in flight or the buffer is empty.
    pub fn play(&self, pcm: Vec<u8>) -> bool {
        if pcm.is_empty() {
            return false;
        }
        if self
            .playing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let playing = Arc::clone(&self.playing);
        let duration = clip_duration(pcm.len());
        thread::spawn(move || {
            // Best effort: pipe through a system PCM player when one exists.
            // Without one, the gate still models playback for its duration so
            // the no-overlap rule holds either way.
            if !pipe_to_player(&pcm) {
                thread::sleep(duration);
            }
            playing.store(false, Ordering::SeqCst);
        });
        true
    }
}

impl Default for SpeechPlayer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn clip_duration(byte_len: usize) -> Duration {
    let samples = byte_len as u64 / BYTES_PER_SAMPLE as u64;
    Duration::from_millis(samples * 1000 / SAMPLE_RATE_HZ as u64)
}

fn pipe_to_player(pcm: &[u8]) -> bool {
    use std::io::Write;

    let spawned = Command::new("aplay")
        .args(["-q", "-f", "S16_LE", "-r", "24000", "-c", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    let Ok(mut child) = spawned else {
        return false;
    };
    if let Some(stdin) = child.stdin.as_mut() {
        if stdin.write_all(pcm).is_err() {
            let _ = child.kill();
            return false;
        }
    }
    drop(child.stdin.take());
    child.wait().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clip_is_rejected() {
        let player = SpeechPlayer::new();
        assert!(!player.play(Vec::new()));
        assert!(!player.is_playing());
    }

    #[test]
    fn overlapping_playback_is_refused() {
        let player = SpeechPlayer::new();
        // ~100ms of silence
        let clip = vec![0u8; (SAMPLE_RATE_HZ as usize / 10) * 2];
        assert!(player.play(clip.clone()));
        assert!(player.is_playing());
        assert!(!player.play(clip));

        // The gate reopens once the clip ends.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while player.is_playing() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!player.is_playing());
    }

    #[test]
    fn duration_matches_sample_math() {
        assert_eq!(clip_duration(48_000), Duration::from_secs(1));
        assert_eq!(clip_duration(4_800), Duration::from_millis(100));
    }
}
