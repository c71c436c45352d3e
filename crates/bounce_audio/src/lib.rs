pub mod context;
pub mod mixer;
pub mod output;

pub use context::AudioContext;
pub use mixer::{Mixer, Player, SampleSource, StereoFrame};
