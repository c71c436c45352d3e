pub mod assets;
pub mod config;
pub mod entity;
pub mod game;
pub mod input;
pub mod time;
pub mod wav_stream;

pub use assets::{AssetRegistry, LoadReport, SpriteImage};
pub use config::GameConfig;
pub use entity::{BounceEdges, Bounds, Entity, EntityKind, SteerInput};
pub use game::{DrawList, Game, SpriteDraw};
pub use wav_stream::{WavStreamReader, DATA_START_OFFSET};

#[cfg(test)]
pub(crate) mod test_support {
    /// Canonical 44-byte-header WAV: 16-bit stereo PCM at 44.1 kHz.
    pub fn canonical_wav(samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&44_100u32.to_le_bytes());
        bytes.extend_from_slice(&(44_100u32 * 4).to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }
}
