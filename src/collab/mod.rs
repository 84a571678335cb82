//! External collaborators: speech synthesis and narration enhancement.
//!
//! Both are async traits so backends can be processes, HTTP services or in-memory fakes. Their
//! failures are tolerated by the pipeline through fallbacks.

pub mod chat;
pub mod enhance;
pub mod tts;

pub use chat::ChatEnhancer;
pub use enhance::{LocalEnhancer, NarrationEnhancer, fallback_narration};
pub use tts::{CommandSynthesizer, SilentSynthesizer, SpeechSynthesizer, SynthesizedAudio};
