use std::io::SeekFrom;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::mixer::{Mixer, Player, SampleSource};
use crate::output::AudioOutput;

/// Entry point for sound playback: owns the mixer and, when a device is
/// available, the output stream that drains it.
pub struct AudioContext {
    sample_rate: u32,
    mixer: Arc<Mutex<Mixer>>,
    output: Option<AudioOutput>,
}

impl AudioContext {
    /// Opens the default output device, or runs headless if there is none.
    pub fn new(sample_rate: u32) -> Self {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let output = match AudioOutput::open(sample_rate, Arc::clone(&mixer)) {
            Ok(output) => Some(output),
            Err(err) => {
                log::warn!("Audio output unavailable ({err}); running without sound");
                None
            }
        };
        Self {
            sample_rate,
            mixer,
            output,
        }
    }

    /// No device; voices only advance when the mixer is pulled directly.
    pub fn headless(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            mixer: Arc::new(Mutex::new(Mixer::new())),
            output: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_headless(&self) -> bool {
        self.output.is_none()
    }

    pub fn device_name(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.device_name.as_str())
    }

    pub fn mixer(&self) -> Arc<Mutex<Mixer>> {
        Arc::clone(&self.mixer)
    }

    /// Plays `elapsed` worth of frames into nowhere when headless, so voices
    /// still finish and can be purged. No-op when a device drains the mixer.
    pub fn advance(&self, elapsed: Duration) {
        if self.output.is_some() {
            return;
        }
        let frames = (elapsed.as_secs_f64() * f64::from(self.sample_rate)).round() as usize;
        match self.mixer.lock() {
            Ok(mut mixer) => mixer.advance(frames),
            Err(_) => log::warn!("Audio mixer lock poisoned; headless voices not advanced"),
        }
    }

    /// Rewinds `source` to its start and registers it as a paused voice.
    pub fn new_player<S>(&self, mut source: S) -> Result<Player, String>
    where
        S: SampleSource + 'static,
    {
        source
            .seek(SeekFrom::Start(0))
            .map_err(|e| format!("Sound source is not seekable: {e}"))?;
        let mut mixer = self
            .mixer
            .lock()
            .map_err(|_| "Audio mixer lock poisoned".to_string())?;
        Ok(mixer.add(Box::new(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounce_core::WavStreamReader;
    use std::io::{self, Read, Seek};

    struct Unseekable;

    impl Read for Unseekable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Seek for Unseekable {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no seeking"))
        }
    }

    #[test]
    fn new_player_rewinds_to_sample_data() {
        let ctx = AudioContext::headless(44_100);
        assert!(ctx.is_headless());
        assert_eq!(ctx.device_name(), None);

        let mut bytes = vec![0u8; 44];
        bytes.extend_from_slice(&16384i16.to_le_bytes());
        bytes.extend_from_slice(&16384i16.to_le_bytes());
        let mut reader = WavStreamReader::new(bytes);
        reader.seek(SeekFrom::End(0)).unwrap();

        let player = ctx.new_player(reader).expect("seekable source");
        player.play();
        let mixer = ctx.mixer();
        let mut mixer = mixer.lock().unwrap();
        assert_eq!(mixer.voice_count(), 1);
        assert_eq!(mixer.next_frame().left, 0.5);
    }

    #[test]
    fn headless_advance_finishes_voices_at_the_sample_rate() {
        let ctx = AudioContext::headless(100);
        let mut bytes = vec![0u8; 44];
        bytes.extend_from_slice(&[1u8; 4 * 50]);
        let player = ctx.new_player(WavStreamReader::new(bytes)).unwrap();
        player.play();

        // 0.4 s at 100 Hz is 40 of the 50 frames.
        ctx.advance(Duration::from_millis(400));
        assert!(player.is_playing());
        ctx.advance(Duration::from_millis(200));
        assert!(!player.is_playing());

        player.close();
        ctx.advance(Duration::ZERO);
        assert_eq!(ctx.mixer().lock().unwrap().voice_count(), 0);
    }

    #[test]
    fn unseekable_source_is_rejected() {
        let ctx = AudioContext::headless(22_050);
        let err = ctx.new_player(Unseekable).unwrap_err();
        assert!(err.contains("not seekable"));
        assert_eq!(ctx.mixer().lock().unwrap().voice_count(), 0);
        assert_eq!(ctx.sample_rate(), 22_050);
    }
}
