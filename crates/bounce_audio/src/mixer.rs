//! Sums every playing voice into one stereo stream.
//!
//! Each voice pulls interleaved 16-bit little-endian stereo frames from its
//! own seekable source. The mixer is owned by the output callback behind a
//! mutex; the game side only holds `Player` handles, which talk to their
//! voice through atomic flags.

use std::io::{self, Read, Seek};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Anything the mixer can stream PCM from.
pub trait SampleSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> SampleSource for T {}

const BYTES_PER_FRAME: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    fn from_le_bytes(bytes: [u8; BYTES_PER_FRAME]) -> Self {
        Self {
            left: sample_to_f32(i16::from_le_bytes([bytes[0], bytes[1]])),
            right: sample_to_f32(i16::from_le_bytes([bytes[2], bytes[3]])),
        }
    }

    fn clamped(self) -> Self {
        Self {
            left: self.left.clamp(-1.0, 1.0),
            right: self.right.clamp(-1.0, 1.0),
        }
    }
}

fn sample_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

#[derive(Debug, Default)]
struct VoiceFlags {
    playing: AtomicBool,
    closed: AtomicBool,
}

struct Voice {
    source: Box<dyn SampleSource>,
    flags: Arc<VoiceFlags>,
}

impl Voice {
    /// `None` at end of stream; the voice then stops playing.
    fn next_frame(&mut self) -> Option<StereoFrame> {
        let mut bytes = [0u8; BYTES_PER_FRAME];
        match self.source.read_exact(&mut bytes) {
            Ok(()) => Some(StereoFrame::from_le_bytes(bytes)),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => None,
            Err(err) => {
                log::warn!("Voice source failed, stopping playback: {err}");
                None
            }
        }
    }
}

/// Game-side handle to one voice. Voices start paused.
///
/// Dropping the handle closes the voice.
#[derive(Debug)]
pub struct Player {
    flags: Arc<VoiceFlags>,
}

impl Player {
    pub fn play(&self) {
        if !self.flags.closed.load(Ordering::Acquire) {
            self.flags.playing.store(true, Ordering::Release);
        }
    }

    pub fn pause(&self) {
        self.flags.playing.store(false, Ordering::Release);
    }

    /// False once paused, closed, or the source ran out of data.
    pub fn is_playing(&self) -> bool {
        self.flags.playing.load(Ordering::Acquire)
    }

    /// Stops the voice; the mixer drops it on its next pull.
    pub fn close(&self) {
        self.flags.playing.store(false, Ordering::Release);
        self.flags.closed.store(true, Ordering::Release);
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Default)]
pub struct Mixer {
    voices: Vec<Voice>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: Box<dyn SampleSource>) -> Player {
        let flags = Arc::new(VoiceFlags::default());
        self.voices.push(Voice {
            source,
            flags: Arc::clone(&flags),
        });
        Player { flags }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn next_frame(&mut self) -> StereoFrame {
        let mut mixed = StereoFrame::default();
        for voice in &mut self.voices {
            if !voice.flags.playing.load(Ordering::Acquire) {
                continue;
            }
            match voice.next_frame() {
                Some(frame) => {
                    mixed.left += frame.left;
                    mixed.right += frame.right;
                }
                None => voice.flags.playing.store(false, Ordering::Release),
            }
        }
        mixed.clamped()
    }

    /// Fills an interleaved output buffer. Mono outputs get the average of
    /// both channels; channels beyond the second are silent.
    pub fn fill<T: Copy>(&mut self, out: &mut [T], channels: usize, convert: impl Fn(f32) -> T) {
        self.drop_closed();
        let silence = convert(0.0);
        for slot in out.chunks_mut(channels.max(1)) {
            let frame = self.next_frame();
            match slot {
                [mono] => *mono = convert((frame.left + frame.right) * 0.5),
                [left, right, rest @ ..] => {
                    *left = convert(frame.left);
                    *right = convert(frame.right);
                    rest.fill(silence);
                }
                [] => {}
            }
        }
    }

    /// Consumes up to `frames` frames without output, stopping early once
    /// nothing is playing. Used when there is no device pulling the mixer.
    pub fn advance(&mut self, frames: usize) {
        self.drop_closed();
        for _ in 0..frames {
            if !self.is_any_playing() {
                break;
            }
            self.next_frame();
        }
    }

    fn is_any_playing(&self) -> bool {
        self.voices
            .iter()
            .any(|voice| voice.flags.playing.load(Ordering::Acquire))
    }

    pub fn drop_closed(&mut self) {
        self.voices
            .retain(|voice| !voice.flags.closed.load(Ordering::Acquire));
    }
}
