use serde_json::json;

use super::{SearchError, SearchProvider, SearchRequest, TavilyProvider};
use crate::config::SearchConfig;
use crate::types::{SearchDepth, SearchTopic};

fn request() -> SearchRequest {
    SearchRequest {
        query: "photosynthesis".to_string(),
        search_depth: SearchDepth::Advanced,
        max_results: 3,
        include_raw_content: true,
        include_images: true,
        include_answer: true,
        include_domains: vec![],
        exclude_domains: vec!["quora.com".to_string()],
        topic: SearchTopic::General,
        time_range: None,
    }
}

#[test]
fn test_parse_response() {
    let body = json!({
        "answer": "  Plants turn light into sugar. ",
        "images": [
            "https://img/1.png",
            {"url": "https://img/2.png", "description": "a leaf"},
            {"description": "no url"},
            42
        ],
        "results": [
            {
                "title": "Photosynthesis",
                "url": "https://example.com/p",
                "content": "snippet",
                "raw_content": "full body",
                "score": 0.87
            },
            {"title": "no url", "content": "dropped"},
            {"url": "https://example.com/q", "raw_content": "   "}
        ]
    });

    let parsed = TavilyProvider::parse_response(&body).unwrap();
    assert_eq!(parsed.answer.as_deref(), Some("Plants turn light into sugar."));
    assert_eq!(parsed.images, vec!["https://img/1.png", "https://img/2.png"]);
    assert_eq!(parsed.results.len(), 2);
    assert_eq!(parsed.results[0].raw_content.as_deref(), Some("full body"));
    assert!((parsed.results[0].score - 0.87).abs() < 1e-9);
    assert_eq!(parsed.results[1].title, "");
    assert_eq!(parsed.results[1].raw_content, None);
    assert!((parsed.results[1].score - 0.5).abs() < 1e-9);
}

#[test]
fn test_parse_response_requires_results() {
    let err = TavilyProvider::parse_response(&json!({"answer": "x"})).unwrap_err();
    assert!(matches!(err, SearchError::InvalidResponse(_)));
}

#[test]
fn test_request_body() {
    let config = SearchConfig {
        tavily_api_key: "tvly-test".to_string(),
        ..Default::default()
    };
    let provider = TavilyProvider::new(&config).unwrap();
    let body = provider.request_body(&request());

    assert_eq!(body["api_key"], "tvly-test");
    assert_eq!(body["search_depth"], "advanced");
    assert_eq!(body["max_results"], 3);
    assert_eq!(body["include_raw_content"], true);
    assert_eq!(body["topic"], "general");
    assert_eq!(body["exclude_domains"], json!(["quora.com"]));
    assert!(body.get("include_domains").is_none());
    assert!(body.get("time_range").is_none());
}

#[tokio::test]
async fn test_missing_api_key() {
    let config = SearchConfig {
        tavily_api_key: String::new(),
        ..Default::default()
    };
    let provider = TavilyProvider::new(&config).unwrap();
    let err = provider.search(&request()).await.unwrap_err();
    assert!(matches!(err, SearchError::NotConfigured("tavily")));
}
