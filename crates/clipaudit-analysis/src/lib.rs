//! Speech transcription, text classification and issue aggregation.
//!
//! Every model is reached through a capability trait ([`SpeechToText`],
//! [`TextClassifier`]) so providers can be swapped at construction time:
//! a Whisper-compatible HTTP endpoint for speech, and Hugging Face,
//! Perspective or the offline lexicon for classification.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod http;
pub mod providers;
pub mod scorer;
pub mod transcription;
pub mod types;

pub use aggregate::{aggregate, issues_for_segment, Aggregation, SegmentFailure};
pub use classify::{Classifiers, DocumentAssessment, TextClassifier};
pub use error::{ClassificationError, ProviderError, TranscriptionError};
pub use http::build_http_client;
pub use scorer::{lexicon_score, toxicity_score};
pub use transcription::{join_segments, RecognizedSegment, SpeechToText, Transcriber};
pub use types::{Classification, ClassificationKind, ClassificationResult, LabelScore};
