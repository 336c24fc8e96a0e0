use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::{Value, json};
use taskwise::llm::chat_completions::ChatCompletionsClient;
use taskwise::{AnalysisError, ContextSample, LlmError, RangePolicy, TaskAnalyzer};

const PATH: &str = "/v1/chat/completions";

fn analysis_json() -> Value {
    json!({
        "priority": { "score": 5, "reasoning": "Client deadline tomorrow", "confidence": 0.92 },
        "deadline": { "suggested": "2025-07-10", "reasoning": "Mentioned in email", "confidence": 0.8 },
        "category": { "suggested": "Work", "reasoning": "Client deliverable", "confidence": 0.95 },
        "enhancedDescription": { "description": "Finalize and send the Q3 report to ACME.", "reasoning": "Adds recipient", "confidence": 0.7 },
        "complexity": { "score": 7, "reasoning": "Many data sources", "confidence": 0.6 },
        "estimatedDuration": { "minutes": 240, "reasoning": "Half a day", "confidence": 0.55 }
    })
}

fn completion(content: &str) -> Value {
    json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }] })
}

fn analyzer(server: &MockServer) -> TaskAnalyzer {
    TaskAnalyzer::new(Arc::new(ChatCompletionsClient::new(server.url(PATH), "test-model")))
}

#[tokio::test]
async fn returns_parsed_analysis() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("Title: Send Q3 report")
                .body_contains("Context 1: ACME wants the report by Thursday");
            then.status(200)
                .json_body(completion(&analysis_json().to_string()));
        })
        .await;

    let samples = vec![ContextSample::new(1, "ACME wants the report by Thursday", 7)];
    let analysis = analyzer(&server)
        .analyze_task("Send Q3 report", Some("numbers from finance"), &samples)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(analysis.priority.value, 5);
    assert_eq!(analysis.priority.confidence, 0.92);
    assert_eq!(analysis.category.value, "Work");
    assert_eq!(
        analysis.enhanced_description.value,
        "Finalize and send the Q3 report to ACME."
    );
    assert_eq!(analysis.complexity.value, 7);
    assert_eq!(analysis.estimated_duration.value, 240);
    assert_eq!(
        analysis.deadline.value.unwrap().date_naive().to_string(),
        "2025-07-10"
    );
}

#[tokio::test]
async fn only_first_five_samples_are_sent() {
    let server = MockServer::start_async().await;
    let with_sixth = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("sample six");
            then.status(200)
                .json_body(completion(&analysis_json().to_string()));
        })
        .await;
    let without_sixth = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH).body_contains("sample five");
            then.status(200)
                .json_body(completion(&analysis_json().to_string()));
        })
        .await;

    let names = ["one", "two", "three", "four", "five", "six", "seven"];
    let samples: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, n)| ContextSample::new(i as i64, format!("sample {n}"), 1))
        .collect();
    analyzer(&server)
        .analyze_task("t", None, &samples)
        .await
        .unwrap();

    with_sixth.assert_hits_async(0).await;
    without_sixth.assert_async().await;
}

#[tokio::test]
async fn prose_reply_is_malformed_with_raw_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .json_body(completion("I think this task is pretty important!"));
        })
        .await;

    let err = analyzer(&server)
        .analyze_task("t", None, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
    assert_eq!(
        err.raw_response(),
        Some("I think this task is pretty important!")
    );
}

#[tokio::test]
async fn server_error_is_model_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(503).body("loading model");
        })
        .await;

    let err = analyzer(&server)
        .analyze_task("t", None, &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::ModelUnavailable(LlmError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn blank_title_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .json_body(completion(&analysis_json().to_string()));
        })
        .await;

    let err = analyzer(&server)
        .analyze_task(" \n ", None, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn out_of_range_score_depends_on_policy() {
    let server = MockServer::start_async().await;
    let mut body = analysis_json();
    body["priority"]["score"] = json!(99);
    let content = body.to_string();
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(completion(&content));
        })
        .await;

    let err = analyzer(&server)
        .analyze_task("t", None, &[])
        .await
        .unwrap_err();
    assert_eq!(err.raw_response(), Some(content.as_str()));

    let clamped = analyzer(&server)
        .range_policy(RangePolicy::Clamp)
        .analyze_task("t", None, &[])
        .await
        .unwrap();
    assert_eq!(clamped.priority.value, 5);
}
