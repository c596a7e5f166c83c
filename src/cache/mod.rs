use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::CacheConfig;
use crate::types::{SearchDepth, SearchResult};

pub mod performance_monitor;
pub use performance_monitor::{CachePerformanceMonitor, CachePerformanceReport};

/// 时间源，测试中可以替换为手动推进的虚拟时钟
pub trait Clock: Send + Sync {
    /// 自UNIX纪元起经过的时间
    fn now(&self) -> Duration;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// 手动推进的时钟
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self {
            now_ms: AtomicU64::new(start.as_millis() as u64),
        }
    }

    pub fn advance(&self, delta: Duration) {
        self.now_ms
            .fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, now: Duration) {
        self.now_ms.store(now.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry {
    timestamp: Duration,
    /// 写入序号，时间戳相同时用来区分先后
    sequence: u64,
    data: Vec<SearchResult>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    next_sequence: u64,
    writes: u64,
}

/// 搜索结果的内存缓存，按TTL惰性过期，按写入时间淘汰最旧条目
pub struct SearchCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    max_size: usize,
    enabled: bool,
    sweep_every_writes: u64,
    clock: Arc<dyn Clock>,
    performance_monitor: CachePerformanceMonitor,
}

impl SearchCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self::with_clock(ttl, max_size, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_size: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
            max_size: max_size.max(1),
            enabled: true,
            sweep_every_writes: 0,
            clock,
            performance_monitor: CachePerformanceMonitor::new(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let mut cache = Self::with_clock(
            Duration::from_secs(config.ttl_seconds),
            config.max_size,
            clock,
        );
        cache.enabled = config.enabled;
        cache.sweep_every_writes = config.sweep_every_writes;
        cache
    }

    /// 生成缓存键：sha256("query|depth|max_results|include_raw")
    pub fn make_key(
        query: &str,
        depth: SearchDepth,
        max_results: usize,
        include_raw: bool,
    ) -> String {
        let raw = format!(
            "{}|{}|{}|{}",
            query.trim().to_lowercase(),
            depth.as_str(),
            max_results,
            include_raw
        );
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, now: Duration, timestamp: Duration) -> bool {
        now.saturating_sub(timestamp) > self.ttl
    }

    /// 获取缓存，未命中或已过期时返回None
    pub fn get(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: usize,
        include_raw: bool,
    ) -> Option<Vec<SearchResult>> {
        if !self.enabled {
            return None;
        }

        let key = Self::make_key(query, depth, max_results, include_raw);
        let now = self.clock.now();
        let mut state = self.lock();

        let expired = match state.entries.get(&key) {
            Some(entry) => self.is_expired(now, entry.timestamp),
            None => {
                self.performance_monitor.record_cache_miss();
                return None;
            }
        };

        if expired {
            state.entries.remove(&key);
            self.performance_monitor.record_cache_miss();
            self.performance_monitor.record_cache_expiration();
            return None;
        }

        let data = state.entries.get(&key).map(|entry| entry.data.clone());
        drop(state);

        tracing::debug!(
            "搜索缓存命中: {}",
            query.chars().take(60).collect::<String>()
        );
        self.performance_monitor.record_cache_hit(depth);
        data
    }

    /// 写入缓存；达到容量时先淘汰时间戳最小的条目
    pub fn put(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: usize,
        include_raw: bool,
        data: Vec<SearchResult>,
    ) {
        if !self.enabled {
            return;
        }

        let key = Self::make_key(query, depth, max_results, include_raw);
        let now = self.clock.now();
        let mut state = self.lock();

        if state.entries.len() >= self.max_size {
            let oldest_key = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.timestamp, entry.sequence))
                .map(|(key, _)| key.clone());
            if let Some(oldest_key) = oldest_key {
                state.entries.remove(&oldest_key);
                self.performance_monitor.record_cache_eviction();
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(
            key,
            CacheEntry {
                timestamp: now,
                sequence,
                data,
            },
        );
        state.writes += 1;
        self.performance_monitor.record_cache_write();

        if self.sweep_every_writes > 0 && state.writes % self.sweep_every_writes == 0 {
            let removed = self.purge_locked(&mut state, now);
            if removed > 0 {
                tracing::debug!("定期清扫移除了{}条过期搜索缓存", removed);
            }
        }
    }

    /// 主动移除所有过期条目，返回移除数量
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        self.purge_locked(&mut state, now)
    }

    fn purge_locked(&self, state: &mut CacheState, now: Duration) -> usize {
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| !self.is_expired(now, entry.timestamp));
        let removed = before - state.entries.len();
        for _ in 0..removed {
            self.performance_monitor.record_cache_expiration();
        }
        removed
    }

    /// 清空所有条目
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 生成性能报告
    pub fn generate_performance_report(&self) -> CachePerformanceReport {
        self.performance_monitor.generate_report()
    }
}
