use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::SearchCache;
use crate::config::Config;
use crate::llm::client::{ChatModel, LLMClient};
use crate::search::provider::{SearchProvider, TavilyProvider};

/// 一次运行中各Agent共享的组件
#[derive(Clone)]
pub struct GeneratorContext {
    /// LLM调用器，用于与AI通信。
    pub llm_client: Arc<dyn ChatModel>,
    /// 网页搜索服务
    pub search_provider: Arc<dyn SearchProvider>,
    /// 搜索结果缓存，由调用方构造并注入
    pub search_cache: Arc<SearchCache>,
    /// 配置
    pub config: Config,
}

impl GeneratorContext {
    /// 根据配置创建真实的LLM客户端、搜索服务和缓存
    pub fn new(config: Config) -> Result<Self> {
        let llm_client =
            LLMClient::new(config.llm.clone()).context("Failed to create LLM client")?;
        let search_provider =
            TavilyProvider::new(&config.search).context("Failed to create search provider")?;
        let search_cache = SearchCache::from_config(&config.cache);

        Ok(Self::with_components(
            config,
            Arc::new(llm_client),
            Arc::new(search_provider),
            Arc::new(search_cache),
        ))
    }

    /// 使用外部提供的组件创建上下文
    pub fn with_components(
        config: Config,
        llm_client: Arc<dyn ChatModel>,
        search_provider: Arc<dyn SearchProvider>,
        search_cache: Arc<SearchCache>,
    ) -> Self {
        Self {
            llm_client,
            search_provider,
            search_cache,
            config,
        }
    }
}
