use std::sync::Arc;

use futures::future::join_all;

use crate::cost::CostTracker;
use crate::llm::client::ChatModel;
use crate::types::SearchResult;

/// 少于该字符数的来源不做提取
const MIN_SOURCE_CHARS: usize = 100;
/// 送入模型的来源正文上限
const SOURCE_PROMPT_CHARS: usize = 4000;
/// 提取结果需超过该字符数才保留
const MIN_EXTRACTED_CHARS: usize = 50;

/// 从一条搜索结果中提取出的教学素材
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub source: SearchResult,
    pub content: String,
}

/// 内容提取器 - 从网页内容中提炼教学相关的部分
pub struct ContentExtractor {
    llm: Arc<dyn ChatModel>,
    max_sources: usize,
}

impl ContentExtractor {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self {
            llm,
            max_sources: 5,
        }
    }

    /// 提取单条结果；内容过短返回空串，模型失败时返回原文
    pub async fn extract_content(
        &self,
        result: &SearchResult,
        topic: &str,
        cost: &CostTracker,
    ) -> String {
        if result.content.chars().count() < MIN_SOURCE_CHARS {
            tracing::warn!("⚠️ 来源内容过短或缺失: {}", result.url);
            return String::new();
        }

        let source_text: String = result.content.chars().take(SOURCE_PROMPT_CHARS).collect();
        let prompt_user = format!(
            include_str!("prompts/content_extraction_user.tpl"),
            topic, source_text
        );

        cost.record_llm_call();
        match self
            .llm
            .prompt(include_str!("prompts/content_extraction_sys.tpl"), &prompt_user)
            .await
        {
            Ok(extracted) => {
                let extracted = extracted.trim().to_string();
                tracing::debug!("从{}提取了{}个字符", result.url, extracted.chars().count());
                extracted
            }
            Err(e) => {
                tracing::error!("❌ 内容提取失败，使用原文: {} - {}", result.url, e);
                result.content.clone()
            }
        }
    }

    /// 并发处理排名靠前的结果
    pub async fn process_multiple(
        &self,
        results: &[SearchResult],
        topic: &str,
        cost: &CostTracker,
    ) -> Vec<ExtractedContent> {
        let top_results = &results[..results.len().min(self.max_sources)];

        let extracted = join_all(
            top_results
                .iter()
                .map(|result| self.extract_content(result, topic, cost)),
        )
        .await;

        let valid: Vec<ExtractedContent> = top_results
            .iter()
            .zip(extracted)
            .filter(|(_, content)| content.chars().count() > MIN_EXTRACTED_CHARS)
            .map(|(source, content)| ExtractedContent {
                source: source.clone(),
                content,
            })
            .collect();

        tracing::info!(
            "✓ 处理了{}个来源，得到{}份有效提取",
            top_results.len(),
            valid.len()
        );
        valid
    }
}
