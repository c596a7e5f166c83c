//! 网页搜索Agent：按计划调用服务商，先查缓存，结果归一化为SearchResult

use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::SearchCache;
use crate::config::SearchConfig;
use crate::cost::CostTracker;
use crate::search::provider::{SearchProvider, SearchRequest};
use crate::types::{SearchDepth, SearchPlan, SearchResult, SearchTopic};

/// 没有搜索计划时使用的结果数上限
const LEGACY_MAX_RESULTS: usize = 5;
/// 没有搜索计划时每条结果保留的字符数
const LEGACY_CONTEXT_BUDGET: usize = 8000;

/// 一次搜索最终采用的参数
struct ResolvedParams {
    request: SearchRequest,
    context_budget_chars: usize,
}

pub struct WebSearchAgent {
    provider: Arc<dyn SearchProvider>,
    cache: Arc<SearchCache>,
    config: SearchConfig,
}

impl WebSearchAgent {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        cache: Arc<SearchCache>,
        config: SearchConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    fn resolve(&self, query: &str, plan: Option<&SearchPlan>) -> ResolvedParams {
        match plan {
            Some(plan) => ResolvedParams {
                request: SearchRequest {
                    query: query.to_string(),
                    search_depth: plan.search_depth,
                    max_results: plan.max_results,
                    include_raw_content: plan.include_raw_content,
                    include_images: plan.include_images,
                    include_answer: plan.include_answer,
                    include_domains: plan.include_domains.clone(),
                    exclude_domains: plan.exclude_domains.clone(),
                    topic: plan.topic,
                    time_range: plan.time_range.clone(),
                },
                context_budget_chars: plan.context_budget_chars,
            },
            None => ResolvedParams {
                request: SearchRequest {
                    query: query.to_string(),
                    search_depth: SearchDepth::Basic,
                    max_results: self.config.max_search_results.min(LEGACY_MAX_RESULTS),
                    include_raw_content: false,
                    include_images: true,
                    include_answer: true,
                    include_domains: vec![],
                    exclude_domains: vec![],
                    topic: SearchTopic::General,
                    time_range: None,
                },
                context_budget_chars: LEGACY_CONTEXT_BUDGET,
            },
        }
    }

    /// 执行单条查询；服务商出错时返回空列表
    pub async fn search(
        &self,
        query: &str,
        plan: Option<&SearchPlan>,
        cost: &CostTracker,
    ) -> Vec<SearchResult> {
        let ResolvedParams {
            request,
            context_budget_chars,
        } = self.resolve(query, plan);

        // 缓存键只包含(query, depth, max_results, raw)
        if let Some(cached) = self.cache.get(
            query,
            request.search_depth,
            request.max_results,
            request.include_raw_content,
        ) {
            cost.record_cache_hit();
            tracing::info!("♻️ 复用缓存的搜索结果: {} ({}条)", query, cached.len());
            return cached;
        }

        tracing::info!(
            provider = self.provider.name(),
            depth = %request.search_depth,
            max_results = request.max_results,
            "🔎 搜索: {}",
            query
        );

        let response = match self.provider.search(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ 搜索失败: {} - {}", query, e);
                return vec![];
            }
        };
        cost.record_search(request.search_depth);

        let mut results: Vec<SearchResult> = response
            .results
            .into_iter()
            .map(|item| {
                let content = match item.raw_content {
                    Some(raw)
                        if request.include_raw_content
                            && raw.chars().count() > item.content.chars().count() =>
                    {
                        truncate_chars(&raw, context_budget_chars)
                    }
                    _ => truncate_chars(&item.content, context_budget_chars),
                };
                SearchResult {
                    title: item.title,
                    url: item.url,
                    content,
                    score: item.score,
                    images: vec![],
                    answer: None,
                }
            })
            .collect();

        if request.include_images
            && let Some(first) = results.first_mut()
        {
            first.images = response
                .images
                .into_iter()
                .take(self.config.max_images_per_response)
                .collect();
        }
        if request.include_answer
            && let Some(first) = results.first_mut()
        {
            first.answer = response.answer;
        }

        tracing::info!("✅ 找到{}条搜索结果", results.len());

        self.cache.put(
            query,
            request.search_depth,
            request.max_results,
            request.include_raw_content,
            results.clone(),
        );
        results
    }

    /// 顺序执行多条查询，按URL去重、按得分排序，并把所有图片合并到第一条结果上
    pub async fn multi_query_search(
        &self,
        queries: &[String],
        plan: Option<&SearchPlan>,
        cost: &CostTracker,
    ) -> Vec<SearchResult> {
        let query_limit = plan.map_or(queries.len(), |p| p.num_queries);
        let result_limit = plan.map_or(self.config.max_search_results, |p| p.max_results);

        let mut all_results: Vec<SearchResult> = vec![];
        let mut seen_urls = HashSet::new();
        let mut pooled_images: Vec<String> = vec![];
        let mut seen_images = HashSet::new();
        let mut pooled_answer: Option<String> = None;
        let mut executed = 0;

        for query in queries.iter().take(query_limit) {
            executed += 1;
            for mut result in self.search(query, plan, cost).await {
                // 只保留第一条查询给出的摘要回答
                if let Some(answer) = result.answer.take()
                    && pooled_answer.is_none()
                {
                    pooled_answer = Some(answer);
                }
                // 先收集图片，被去重丢弃的结果上的图片也要保留
                for image in &result.images {
                    if seen_images.insert(normalize_image_url(image)) {
                        pooled_images.push(image.clone());
                    }
                }
                if seen_urls.insert(result.url.clone()) {
                    all_results.push(result);
                }
            }
        }

        all_results.sort_by(|a, b| b.score.total_cmp(&a.score));
        all_results.truncate(result_limit);

        if let Some(first) = all_results.first_mut() {
            let mut present: HashSet<String> =
                first.images.iter().map(|i| normalize_image_url(i)).collect();
            for image in pooled_images {
                if present.insert(normalize_image_url(&image)) {
                    first.images.push(image);
                }
            }
            first.answer = pooled_answer;
        }

        tracing::info!(
            "🔀 多查询搜索: {}条查询 → {}条去重结果",
            executed,
            all_results.len()
        );
        all_results
    }
}

/// 按出现顺序收集去重后的图片URL，最多limit张
pub fn collect_unique_images(results: &[SearchResult], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .iter()
        .flat_map(|r| r.images.iter())
        .filter(|image| seen.insert(normalize_image_url(image)))
        .take(limit)
        .cloned()
        .collect()
}

/// 第一条带摘要回答的结果上的回答
pub fn search_summary(results: &[SearchResult]) -> Option<&str> {
    results
        .iter()
        .find_map(|r| r.answer.as_deref())
        .map(str::trim)
        .filter(|answer| !answer.is_empty())
}

/// 图片去重键：小写并去掉查询串
pub fn normalize_image_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_query = trimmed.split('?').next().unwrap_or(trimmed);
    without_query.to_lowercase()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
