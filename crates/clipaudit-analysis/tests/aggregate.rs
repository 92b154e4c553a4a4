//! Aggregator behaviour with scripted classifiers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipaudit_analysis::providers::{LexiconSentiment, LexiconToxicity};
use clipaudit_analysis::{aggregate, Classifiers, LabelScore, ProviderError, TextClassifier};
use clipaudit_core::{IssueCategory, TranscriptSegment};

/// Harmful-content classifier driven by keywords in the text.
///
/// `toxic6` scores 0.6, `toxic4` scores 0.4, `boom` fails, anything else
/// scores 0.0. `slowN` sleeps N milliseconds first.
struct Scripted;

#[async_trait]
impl TextClassifier for Scripted {
    fn provider(&self) -> &'static str {
        "scripted"
    }

    async fn classify(&self, text: &str) -> Result<LabelScore, ProviderError> {
        for word in text.split_whitespace() {
            if let Some(ms) = word.strip_prefix("slow").and_then(|n| n.parse().ok()) {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
        if text.contains("boom") {
            return Err(ProviderError::Malformed("scripted failure".to_string()));
        }
        let score = if text.contains("toxic6") {
            0.6
        } else if text.contains("toxic4") {
            0.4
        } else {
            0.0
        };
        Ok(LabelScore::new("toxicity", score))
    }
}

fn classifiers() -> Classifiers {
    Classifiers::new(Arc::new(LexiconSentiment), Arc::new(Scripted))
}

fn seg(start: f64, text: &str) -> TranscriptSegment {
    TranscriptSegment::new(start, start + 1.0, text).unwrap()
}

#[tokio::test]
async fn toxic_segment_above_threshold_emits_exactly_one_issue() {
    let segments = vec![seg(1.0, "hello toxic4"), seg(12.5, "hello toxic6")];

    let result = aggregate(&segments, &classifiers(), 4).await;

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].category, IssueCategory::ToxicContent);
    assert_eq!(result.issues[0].timestamp, "00:00:12");
    assert_eq!(result.classification_failures(), 0);
}

#[tokio::test]
async fn failed_segment_is_tallied_once_and_excluded() {
    let segments = vec![
        seg(0.0, "this is terrible boom"),
        seg(2.0, "this is terrible"),
    ];

    let result = aggregate(&segments, &classifiers(), 2).await;

    assert_eq!(result.classification_failures(), 1);
    assert_eq!(result.failures[0].index, 0);
    assert_eq!(result.failures[0].timestamp, "00:00:00");
    assert_eq!(result.failures[0].errors.len(), 1);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].category, IssueCategory::NegativeSentiment);
    assert_eq!(result.issues[0].timestamp, "00:00:02");
}

#[tokio::test]
async fn concurrent_results_keep_segment_order() {
    let segments = vec![
        seg(1.0, "slow60 toxic6"),
        seg(2.0, "slow30 toxic6"),
        seg(3.0, "slow0 toxic6"),
        seg(4.0, "slow10 toxic6"),
    ];

    let result = aggregate(&segments, &classifiers(), 4).await;

    let timestamps: Vec<_> = result.issues.iter().map(|i| i.timestamp.as_str()).collect();
    assert_eq!(timestamps, vec!["00:00:01", "00:00:02", "00:00:03", "00:00:04"]);
}

#[tokio::test]
async fn zero_concurrency_is_treated_as_one() {
    let segments = vec![seg(0.0, "toxic6")];
    let result = aggregate(&segments, &classifiers(), 0).await;
    assert_eq!(result.issues.len(), 1);
}

#[tokio::test]
async fn lexicon_providers_flag_abuse_and_negativity() {
    let both = Classifiers::new(Arc::new(LexiconSentiment), Arc::new(LexiconToxicity));
    let segments = vec![seg(5.0, "you are a moron and this is terrible")];

    let result = aggregate(&segments, &both, 1).await;

    let categories: Vec<_> = result.issues.iter().map(|i| i.category).collect();
    assert_eq!(
        categories,
        vec![IssueCategory::ToxicContent, IssueCategory::NegativeSentiment]
    );
}

#[tokio::test]
async fn aggregate_runs_on_a_spawned_task() {
    let classifiers = Arc::new(classifiers());
    let segments = vec![seg(0.0, "this is terrible"), seg(3.0, "hello toxic6")];

    let handle = tokio::spawn({
        let classifiers = Arc::clone(&classifiers);
        async move { aggregate(&segments, &classifiers, 2).await }
    });
    let result = handle.await.expect("aggregation task panicked");

    assert_eq!(result.issues.len(), 2);
    assert_eq!(result.issues[0].timestamp, "00:00:00");
    assert_eq!(result.issues[1].timestamp, "00:00:03");
}

/// Counts how many calls are in flight at once.
struct Gauge {
    current: std::sync::atomic::AtomicUsize,
    peak: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl TextClassifier for Gauge {
    fn provider(&self) -> &'static str {
        "gauge"
    }

    async fn classify(&self, _text: &str) -> Result<LabelScore, ProviderError> {
        use std::sync::atomic::Ordering;
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(LabelScore::new("toxicity", 0.0))
    }
}

#[tokio::test]
async fn concurrency_bounds_segments_in_flight() {
    let gauge = Arc::new(Gauge {
        current: 0.into(),
        peak: 0.into(),
    });
    let classifiers = Classifiers::new(Arc::new(LexiconSentiment), gauge.clone());
    let segments: Vec<_> = (0..12).map(|i| seg(f64::from(i), "hello")).collect();

    aggregate(&segments, &classifiers, 3).await;

    let peak = gauge.peak.load(std::sync::atomic::Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight harmful calls {peak} exceeds 3");
    assert!(peak >= 2, "segments were not classified concurrently (peak {peak})");
}
