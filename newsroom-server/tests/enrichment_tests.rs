//! Integration tests for the external enrichment clients
//!
//! Every client is pointed at a local mock server; no test reaches the
//! real services.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use newsroom_common::config::NewsroomConfig;
use newsroom_common::db::init::init_database;
use newsroom_common::db::NewsStatus;
use newsroom_server::assistant::{AssistantError, ChatAssistant, PineconeAssistant};
use newsroom_server::db::Location;
use newsroom_server::enrich::{
    ClassifierError, Enricher, EvidenceError, EvidenceSource, LlmClassifier, NewsApiClient,
    NewsClassifier, Submission, WebSearchClient,
};
use newsroom_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PAGE: &str = r#"
    <html><body>
      <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.reuters.com%2Fworld%2F1">Reuters: Flooding in Assam</a>
      <a class="result__a" href="https://blog.example.org/post">A personal blog</a>
    </body></html>
"#;

fn model_reply(content: &str) -> Value {
    json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    })
}

// =============================================================================
// Web search
// =============================================================================

#[tokio::test]
async fn test_web_search_parses_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "Flooding in Assam"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebSearchClient::new().unwrap().with_base_url(&server.uri());
    let batch = client.gather("Flooding in Assam").await.unwrap();

    assert_eq!(batch.sources.len(), 2);
    assert_eq!(batch.sources[0].url, "https://www.reuters.com/world/1");
    assert_eq!(batch.trusted_hits, 1);
}

#[tokio::test]
async fn test_web_search_truncates_query() {
    let server = MockServer::start().await;
    let text = "x".repeat(500);
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "x".repeat(200).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebSearchClient::new().unwrap().with_base_url(&server.uri());
    let batch = client.gather(&text).await.unwrap();
    assert!(batch.sources.is_empty());
}

#[tokio::test]
async fn test_web_search_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let client = WebSearchClient::new().unwrap().with_base_url(&server.uri());
    match client.gather("anything").await {
        Err(EvidenceError::Api(status, body)) => {
            assert_eq!(status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

// =============================================================================
// News API
// =============================================================================

#[tokio::test]
async fn test_news_api_articles_count_as_corroboration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("apiKey", "news-key"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "articles": [
                {"title": "Floods in the north-east", "url": "https://a.example/1"},
                {"title": null, "url": "https://b.example/2"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NewsApiClient::new("news-key")
        .unwrap()
        .with_base_url(&server.uri());
    let batch = client.gather("floods").await.unwrap();

    assert_eq!(batch.trusted_hits, 2);
    assert_eq!(batch.sources[0].title, "Floods in the north-east");
    assert_eq!(batch.sources[1].title, "");
}

#[tokio::test]
async fn test_news_api_bad_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status": "error"})))
        .mount(&server)
        .await;

    let client = NewsApiClient::new("wrong").unwrap().with_base_url(&server.uri());
    assert!(matches!(
        client.gather("floods").await,
        Err(EvidenceError::Api(401, _))
    ));
}

// =============================================================================
// Language-model classifier
// =============================================================================

#[tokio::test]
async fn test_classifier_parses_fenced_reply() {
    let server = MockServer::start().await;
    let content = "```json\n{\"headline\": \"Floods hit Assam\", \"summary\": \"Rivers rose.\", \
        \"district\": \"Kamrup\", \"state\": \"Assam\", \"country\": \"India\", \
        \"category\": \"Environment\", \"credibility\": 0.82, \"fake_prob\": \"0.1\"}\n```";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header_eq("authorization", "Bearer model-key"))
        .and(body_partial_json(json!({"model": "test-model", "temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(content)))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new("model-key")
        .unwrap()
        .with_base_url(&server.uri())
        .with_model("test-model");
    let analysis = classifier.classify("Rivers rose across Assam").await.unwrap();

    assert_eq!(analysis.headline, "Floods hit Assam");
    assert_eq!(analysis.category, "Environment");
    assert_eq!(analysis.district, "Kamrup");
    assert_eq!(analysis.model_scores(), Some((0.82, 0.1)));
}

#[tokio::test]
async fn test_classifier_reply_without_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(model_reply("I cannot help with that.")),
        )
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new("model-key")
        .unwrap()
        .with_base_url(&server.uri());
    assert!(matches!(
        classifier.classify("text").await,
        Err(ClassifierError::NoJson)
    ));
}

// =============================================================================
// Pipeline
// =============================================================================

fn submission(text: &str, source: &str) -> Submission {
    Submission {
        full_text: text.to_string(),
        source: source.to_string(),
        location: Location {
            district: String::new(),
            state: String::new(),
            country: "India".to_string(),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pipeline_uses_model_scores_and_location() {
    let server = MockServer::start().await;
    let content = r#"{"headline": "Bridge closed", "summary": "The old bridge is shut.",
        "district": "Howrah", "state": "West Bengal", "country": "Bangladesh",
        "category": "Infrastructure", "credibility": 0.3, "fake_prob": 0.7}"#;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(content)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [{"title": "Bridge repairs", "url": "https://c.example/3"}]
        })))
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new("key").unwrap().with_base_url(&server.uri());
    let news_api = NewsApiClient::new("key").unwrap().with_base_url(&server.uri());
    let enricher = Enricher::new(vec![Box::new(news_api)], Some(Box::new(classifier)));

    let doc = enricher
        .ingest(submission("The old bridge was shut this morning 🚧", "telegram"))
        .await;

    assert_eq!(doc.title, "Bridge closed");
    assert_eq!(doc.summary, "The old bridge is shut.");
    assert_eq!(doc.category, "Infrastructure");
    assert_eq!(doc.status, NewsStatus::Monitoring);
    assert_eq!(doc.credibility, 0.3);
    assert_eq!(doc.fake_prob, 0.7);
    // submitted fields win, blanks are filled from the model
    assert_eq!(doc.location.country, "India");
    assert_eq!(doc.location.district, "Howrah");
    assert_eq!(doc.location.state, "West Bengal");
    assert_eq!(doc.evidence_sources.len(), 1);
    assert!(!doc.full_text.contains('🚧'));
}

#[tokio::test]
async fn test_pipeline_survives_failing_integrations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let classifier = LlmClassifier::new("key").unwrap().with_base_url(&server.uri());
    let search = WebSearchClient::new().unwrap().with_base_url(&server.uri());
    let enricher = Enricher::new(vec![Box::new(search)], Some(Box::new(classifier)));

    let doc = enricher
        .ingest(submission("Council meeting postponed until next week", "Times of India"))
        .await;

    assert_eq!(doc.status, NewsStatus::Verified);
    assert_eq!(doc.credibility, 1.0);
    assert_eq!(doc.fake_prob, 0.0);
    assert_eq!(doc.category, "general");
    assert_eq!(doc.title, "Council meeting postponed until next week");
    assert!(doc.evidence_sources.is_empty());
}

// =============================================================================
// Chat assistant
// =============================================================================

#[tokio::test]
async fn test_assistant_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistant/chat/news"))
        .and(header_eq("api-key", "pc-key"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "Any floods?"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "Yes, in Assam."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = PineconeAssistant::new("pc-key", "news")
        .unwrap()
        .with_base_url(&server.uri());
    assert_eq!(assistant.chat("Any floods?").await.unwrap(), "Yes, in Assam.");
}

#[tokio::test]
async fn test_assistant_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such assistant"))
        .mount(&server)
        .await;

    let assistant = PineconeAssistant::new("pc-key", "missing")
        .unwrap()
        .with_base_url(&server.uri());
    assert!(matches!(
        assistant.chat("hello").await,
        Err(AssistantError::Api(404, _))
    ));
}

#[tokio::test]
async fn test_chat_route_with_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistant/chat/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"content": "Nothing new today."}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let config = NewsroomConfig::with_root(dir.path());
    let db = init_database(&config.database_path()).await.unwrap();
    let assistant: Arc<dyn ChatAssistant> = Arc::new(
        PineconeAssistant::new("pc-key", "news")
            .unwrap()
            .with_base_url(&server.uri()),
    );
    let app = build_router(AppState::new(db, config, Enricher::offline(), Some(assistant)));

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"message": "What happened?"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["reply"], "Nothing new today.");
}
