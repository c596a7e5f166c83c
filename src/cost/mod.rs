//! 单次请求的搜索成本统计
//!
//! CostTracker随请求显式传递，不依赖任何全局状态。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::SearchDepth;

/// 每个Tavily credit的价格（美元）
pub const CREDIT_USD: f64 = 0.008;

/// 单次请求的成本累加器
#[derive(Debug, Default)]
pub struct CostTracker {
    basic_queries: AtomicU64,
    advanced_queries: AtomicU64,
    cached_queries: AtomicU64,
    llm_calls: AtomicU64,
}

/// 请求结束时输出的成本摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub basic_queries: u64,
    pub advanced_queries: u64,
    /// 被缓存拦下、没有产生费用的查询
    pub cached_queries: u64,
    pub credits: u64,
    pub usd: f64,
    pub rate_per_credit_usd: f64,
    pub llm_calls: u64,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次真实发出的搜索调用
    pub fn record_search(&self, depth: SearchDepth) {
        let counter = match depth {
            SearchDepth::Basic => &self.basic_queries,
            SearchDepth::Advanced => &self.advanced_queries,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cached_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_llm_call(&self) {
        self.llm_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// basic计1，advanced计2
    pub fn credits(&self) -> u64 {
        self.basic_queries.load(Ordering::Relaxed) + 2 * self.advanced_queries.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> CostSummary {
        let credits = self.credits();
        let usd = (credits as f64 * CREDIT_USD * 1_000_000.0).round() / 1_000_000.0;
        CostSummary {
            basic_queries: self.basic_queries.load(Ordering::Relaxed),
            advanced_queries: self.advanced_queries.load(Ordering::Relaxed),
            cached_queries: self.cached_queries.load(Ordering::Relaxed),
            credits,
            usd,
            rate_per_credit_usd: CREDIT_USD,
            llm_calls: self.llm_calls.load(Ordering::Relaxed),
        }
    }

    /// 追加一行JSON到成本日志，失败只记录警告
    pub fn append_to_log(&self, path: &Path) {
        if let Err(e) = write_log_line(path, &self.summary()) {
            tracing::warn!("⚠️ 写入成本日志失败: {:#}", e);
        }
    }
}

fn write_log_line(path: &Path, summary: &CostSummary) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let line = serde_json::to_string(&serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "cost": summary,
    }))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open cost log: {}", path.display()))?;
    writeln!(file, "{}", line)?;
    Ok(())
}

#[cfg(test)]
mod tests;
