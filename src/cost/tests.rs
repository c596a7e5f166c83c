use super::{CREDIT_USD, CostTracker};
use crate::types::SearchDepth;

#[test]
fn test_empty_tracker() {
    let summary = CostTracker::new().summary();
    assert_eq!(summary.credits, 0);
    assert_eq!(summary.usd, 0.0);
    assert_eq!(summary.llm_calls, 0);
}

#[test]
fn test_credit_accounting() {
    let tracker = CostTracker::new();
    tracker.record_search(SearchDepth::Basic);
    tracker.record_search(SearchDepth::Basic);
    tracker.record_search(SearchDepth::Advanced);
    tracker.record_cache_hit();
    tracker.record_llm_call();

    let summary = tracker.summary();
    assert_eq!(summary.basic_queries, 2);
    assert_eq!(summary.advanced_queries, 1);
    assert_eq!(summary.cached_queries, 1);
    assert_eq!(summary.credits, 4);
    assert!((summary.usd - 4.0 * CREDIT_USD).abs() < 1e-9);
    assert_eq!(summary.llm_calls, 1);
}

#[test]
fn test_append_to_log_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("cost.jsonl");

    let tracker = CostTracker::new();
    tracker.record_search(SearchDepth::Advanced);
    tracker.append_to_log(&path);
    tracker.append_to_log(&path);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["cost"]["credits"], 2);
    let timestamp = entry["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[test]
fn test_append_to_log_swallows_errors() {
    let dir = tempfile::tempdir().unwrap();
    // 目录路径无法作为文件打开
    CostTracker::new().append_to_log(dir.path());
}
