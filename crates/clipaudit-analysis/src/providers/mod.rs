//! Concrete capability providers.

mod huggingface;
mod lexicon;
mod perspective;
mod whisper;

pub use huggingface::{HuggingFaceClassifier, HuggingFaceMode};
pub use lexicon::{LexiconSentiment, LexiconToxicity};
pub use perspective::PerspectiveClassifier;
pub use whisper::WhisperHttp;
