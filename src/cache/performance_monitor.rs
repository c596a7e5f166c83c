use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::SearchDepth;

/// 缓存性能监控器
#[derive(Clone, Default)]
pub struct CachePerformanceMonitor {
    metrics: Arc<CacheMetrics>,
}

/// 缓存指标
#[derive(Default)]
pub struct CacheMetrics {
    /// 缓存命中次数
    pub cache_hits: AtomicU64,
    /// 缓存未命中次数（含过期）
    pub cache_misses: AtomicU64,
    /// 缓存写入次数
    pub cache_writes: AtomicU64,
    /// 容量淘汰次数
    pub cache_evictions: AtomicU64,
    /// 过期移除次数
    pub cache_expirations: AtomicU64,
    /// 命中所节省的搜索credit
    pub credits_saved: AtomicU64,
}

/// 缓存性能报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePerformanceReport {
    /// 缓存命中率
    pub hit_rate: f64,
    /// 总读取次数
    pub total_lookups: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_writes: u64,
    pub cache_evictions: u64,
    pub cache_expirations: u64,
    /// 节省的搜索credit（basic=1，advanced=2）
    pub credits_saved: u64,
}

impl CachePerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录缓存命中
    pub fn record_cache_hit(&self, depth: SearchDepth) {
        self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
        let credits = match depth {
            SearchDepth::Basic => 1,
            SearchDepth::Advanced => 2,
        };
        self.metrics
            .credits_saved
            .fetch_add(credits, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_write(&self) {
        self.metrics.cache_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_eviction(&self) {
        self.metrics.cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_expiration(&self) {
        self.metrics
            .cache_expirations
            .fetch_add(1, Ordering::Relaxed);
    }

    /// 生成性能报告
    pub fn generate_report(&self) -> CachePerformanceReport {
        let hits = self.metrics.cache_hits.load(Ordering::Relaxed);
        let misses = self.metrics.cache_misses.load(Ordering::Relaxed);
        let total_lookups = hits + misses;
        let hit_rate = if total_lookups > 0 {
            hits as f64 / total_lookups as f64
        } else {
            0.0
        };

        CachePerformanceReport {
            hit_rate,
            total_lookups,
            cache_hits: hits,
            cache_misses: misses,
            cache_writes: self.metrics.cache_writes.load(Ordering::Relaxed),
            cache_evictions: self.metrics.cache_evictions.load(Ordering::Relaxed),
            cache_expirations: self.metrics.cache_expirations.load(Ordering::Relaxed),
            credits_saved: self.metrics.credits_saved.load(Ordering::Relaxed),
        }
    }
}

impl CachePerformanceReport {
    /// 单行摘要，用于运行结束时的日志
    pub fn summary_line(&self) -> String {
        format!(
            "命中率 {:.1}% ({}/{}), 写入 {}, 淘汰 {}, 过期 {}, 节省 {} credits",
            self.hit_rate * 100.0,
            self.cache_hits,
            self.total_lookups,
            self.cache_writes,
            self.cache_evictions,
            self.cache_expirations,
            self.credits_saved
        )
    }
}
