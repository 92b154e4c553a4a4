//! Issue aggregation: correlates classifier output with segment timestamps.

use clipaudit_core::{format_timestamp, Issue, IssueCategory, TranscriptSegment, TOXICITY_THRESHOLD};
use futures::stream::{self, StreamExt};

use crate::classify::Classifiers;
use crate::error::ClassificationError;
use crate::types::{Classification, ClassificationResult};

/// A segment whose classification failed. It contributes no issues.
#[derive(Debug, Clone)]
pub struct SegmentFailure {
    pub index: usize,
    pub timestamp: String,
    pub errors: Vec<ClassificationError>,
}

/// Issues in segment order plus the classification-failure tally.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub issues: Vec<Issue>,
    pub failures: Vec<SegmentFailure>,
}

impl Aggregation {
    /// Number of segments whose classification failed.
    #[must_use]
    pub fn classification_failures(&self) -> usize {
        self.failures.len()
    }
}

/// Issues raised by one successfully classified segment.
///
/// A toxic content issue needs a harmful-content score strictly above
/// [`TOXICITY_THRESHOLD`]; a negative sentiment issue needs the label
/// `negative` (any case). Both may fire for the same segment.
#[must_use]
pub fn issues_for_segment(
    segment: &TranscriptSegment,
    sentiment: &Classification,
    harmful: &Classification,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    if harmful.score > TOXICITY_THRESHOLD {
        issues.push(Issue::at(
            segment,
            IssueCategory::ToxicContent,
            Some(harmful.score),
        ));
    }
    if sentiment.is_negative() {
        issues.push(Issue::at(
            segment,
            IssueCategory::NegativeSentiment,
            Some(sentiment.score),
        ));
    }
    issues
}

/// Classify every segment and collect issues in source order.
///
/// Segments are classified concurrently, at most `concurrency` segments at
/// a time, and reassembled in their original order before issues are
/// derived. Each segment calls both classifiers, so up to `2 * concurrency`
/// provider requests can be in flight.
pub async fn aggregate(
    segments: &[TranscriptSegment],
    classifiers: &Classifiers,
    concurrency: usize,
) -> Aggregation {
    // Collected before streaming: a borrowing `.map` closure makes the
    // returned future non-`Send`.
    let pending: Vec<_> = segments
        .iter()
        .map(|segment| classifiers.classify_both(&segment.text))
        .collect();
    let verdicts: Vec<(ClassificationResult, ClassificationResult)> = stream::iter(pending)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut aggregation = Aggregation::default();
    for (index, (segment, verdict)) in segments.iter().zip(verdicts).enumerate() {
        match verdict {
            (Ok(sentiment), Ok(harmful)) => {
                aggregation
                    .issues
                    .extend(issues_for_segment(segment, &sentiment, &harmful));
            }
            (sentiment, harmful) => {
                let errors: Vec<ClassificationError> =
                    [sentiment.err(), harmful.err()].into_iter().flatten().collect();
                for error in &errors {
                    tracing::warn!(
                        segment = index,
                        kind = %error.kind,
                        provider = error.provider,
                        error = %error.message,
                        "segment classification failed"
                    );
                }
                aggregation.failures.push(SegmentFailure {
                    index,
                    timestamp: format_timestamp(segment.start_seconds),
                    errors,
                });
            }
        }
    }

    tracing::debug!(
        segments = segments.len(),
        issues = aggregation.issues.len(),
        failures = aggregation.classification_failures(),
        "aggregation complete"
    );
    aggregation
}
