//! 搜索服务商抽象与Tavily实现

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::SearchConfig;
use crate::types::{SearchDepth, SearchTopic};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider `{0}` is not configured (missing API key)")]
    NotConfigured(&'static str),

    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid search response: {0}")]
    InvalidResponse(String),
}

/// 一次服务商调用的全部参数，由SearchPlan解析而来
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: SearchDepth,
    pub max_results: usize,
    pub include_raw_content: bool,
    pub include_images: bool,
    pub include_answer: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub topic: SearchTopic,
    pub time_range: Option<String>,
}

/// 服务商返回的单条结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResult {
    pub title: String,
    pub url: String,
    /// 服务商给出的摘要片段
    pub content: String,
    /// 网页全文，仅在请求raw content时可能存在
    pub raw_content: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub results: Vec<ProviderResult>,
    pub images: Vec<String>,
    pub answer: Option<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, request: &SearchRequest) -> Result<ProviderResponse, SearchError>;
}

/// Tavily搜索服务
pub struct TavilyProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl TavilyProvider {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_key: config.tavily_api_key.clone(),
            endpoint: format!("{}/search", config.api_base_url.trim_end_matches('/')),
        })
    }

    fn request_body(&self, request: &SearchRequest) -> Value {
        let mut body = json!({
            "api_key": self.api_key,
            "query": request.query,
            "search_depth": request.search_depth.as_str(),
            "max_results": request.max_results,
            "include_raw_content": request.include_raw_content,
            "include_images": request.include_images,
            "include_answer": request.include_answer,
            "topic": match request.topic {
                SearchTopic::General => "general",
                SearchTopic::News => "news",
            },
        });
        if !request.include_domains.is_empty() {
            body["include_domains"] = json!(request.include_domains);
        }
        if !request.exclude_domains.is_empty() {
            body["exclude_domains"] = json!(request.exclude_domains);
        }
        if let Some(time_range) = &request.time_range {
            body["time_range"] = json!(time_range);
        }
        body
    }

    /// 解析Tavily响应，图片既可能是URL字符串也可能是{url, description}对象
    pub fn parse_response(body: &Value) -> Result<ProviderResponse, SearchError> {
        let Some(items) = body.get("results").and_then(Value::as_array) else {
            return Err(SearchError::InvalidResponse(
                "missing `results` array".to_string(),
            ));
        };

        let results = items
            .iter()
            .filter_map(|r| {
                Some(ProviderResult {
                    url: r["url"].as_str()?.to_string(),
                    title: r["title"].as_str().unwrap_or_default().to_string(),
                    content: r["content"].as_str().unwrap_or_default().to_string(),
                    raw_content: r["raw_content"]
                        .as_str()
                        .filter(|s| !s.trim().is_empty())
                        .map(str::to_string),
                    score: r["score"].as_f64().unwrap_or(0.5),
                })
            })
            .collect();

        let images = body["images"]
            .as_array()
            .map(|images| {
                images
                    .iter()
                    .filter_map(|image| match image {
                        Value::String(url) => Some(url.clone()),
                        Value::Object(obj) => obj.get("url")?.as_str().map(str::to_string),
                        _ => None,
                    })
                    .filter(|url| !url.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let answer = body["answer"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(ProviderResponse {
            results,
            images,
            answer,
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, request: &SearchRequest) -> Result<ProviderResponse, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::NotConfigured("tavily"));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body: Value = response.json().await?;
        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests;
