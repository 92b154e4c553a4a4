//! Integration tests for the HTTP classification providers using wiremock.

use clipaudit_analysis::providers::{HuggingFaceClassifier, PerspectiveClassifier};
use clipaudit_analysis::{build_http_client, ProviderError, TextClassifier};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    build_http_client(5).expect("client construction should not fail")
}

#[tokio::test]
async fn huggingface_sentiment_returns_top_label() {
    let server = MockServer::start().await;
    let body = serde_json::json!([[
        { "label": "NEGATIVE", "score": 0.9991 },
        { "label": "POSITIVE", "score": 0.0009 }
    ]]);

    Mock::given(method("POST"))
        .and(path("/models/distilbert-sst2"))
        .and(header("authorization", "Bearer hf-key"))
        .and(body_json(serde_json::json!({ "inputs": "this is terrible" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let classifier = HuggingFaceClassifier::sentiment(
        client(),
        &format!("{}/", server.uri()),
        "distilbert-sst2",
        Some("hf-key".to_string()),
    );
    let result = classifier.classify("this is terrible").await.unwrap();

    assert_eq!(result.label, "NEGATIVE");
    assert!((result.score - 0.9991).abs() < 1e-9);
}

#[tokio::test]
async fn huggingface_toxicity_reads_target_label_from_flat_list() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        { "label": "insult", "score": 0.7 },
        { "label": "toxic", "score": 0.61 }
    ]);

    Mock::given(method("POST"))
        .and(path("/models/unitary/toxic-bert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let classifier =
        HuggingFaceClassifier::toxicity(client(), &server.uri(), "unitary/toxic-bert", None);
    let result = classifier.classify("text").await.unwrap();

    assert_eq!(result.label, "toxic");
    assert!((result.score - 0.61).abs() < 1e-9);
}

#[tokio::test]
async fn huggingface_missing_target_label_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([[{ "label": "neutral", "score": 1.0 }]])),
        )
        .mount(&server)
        .await;

    let classifier = HuggingFaceClassifier::toxicity(client(), &server.uri(), "m", None);
    let err = classifier.classify("text").await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn huggingface_upstream_error_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
        .mount(&server)
        .await;

    let classifier = HuggingFaceClassifier::sentiment(client(), &server.uri(), "m", None);
    match classifier.classify("text").await.unwrap_err() {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("loading"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn perspective_returns_toxicity_summary_score() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "attributeScores": {
            "TOXICITY": {
                "spanScores": [],
                "summaryScore": { "value": 0.83, "type": "PROBABILITY" }
            }
        },
        "languages": ["en"]
    });

    Mock::given(method("POST"))
        .and(path("/v1alpha1/comments:analyze"))
        .and(header("x-goog-api-key", "p-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let classifier = PerspectiveClassifier::new(client(), &server.uri(), "p-key");
    let result = classifier.classify("you idiot").await.unwrap();

    assert_eq!(result.label, "toxicity");
    assert!((result.score - 0.83).abs() < 1e-9);
}

#[tokio::test]
async fn perspective_without_attribute_scores_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let classifier = PerspectiveClassifier::new(client(), &server.uri(), "p-key");
    let err = classifier.classify("text").await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn perspective_key_stays_out_of_transport_errors() {
    // Nothing listens on port 1, so the request fails before any response.
    let classifier = PerspectiveClassifier::new(client(), "http://127.0.0.1:1", "SUPERSECRETKEY");
    let err = classifier.classify("text").await.unwrap_err();

    assert!(matches!(err, ProviderError::Http(_)), "got {err:?}");
    assert!(!err.to_string().contains("SUPERSECRETKEY"), "key leaked: {err}");
    assert!(!format!("{err:?}").contains("SUPERSECRETKEY"), "key leaked: {err:?}");
}

#[tokio::test]
async fn perspective_sends_no_key_in_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let classifier = PerspectiveClassifier::new(client(), &server.uri(), "p-key");
    let err = classifier.classify("text").await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 500, .. }), "got {err:?}");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
}
