//! LLM客户端 - 提供统一的LLM服务接口

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::llm::client::utils::evaluate_befitting_model;

mod providers;
pub mod utils;

use providers::ProviderClient;

/// 各Agent依赖的最小对话接口，测试中可替换为假实现
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// 通用重试逻辑，用于处理异步操作的重试机制
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_retries = self.config.retry_attempts.max(1);
        let retry_delay_ms = self.config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    tracing::warn!(
                        "❌ 调用模型服务出错，重试中 (第 {} / {}次尝试): {}",
                        retries,
                        max_retries,
                        err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
                }
            }
        }
    }

    /// 使用指定模型的单轮对话，带重试与超时
    async fn prompt_with_model(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String> {
        let agent = self.client.create_agent(model, system_prompt, &self.config);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        self.retry_with_backoff(|| async {
            tokio::time::timeout(timeout, agent.prompt(user_prompt))
                .await
                .with_context(|| format!("模型{}响应超时", model))?
        })
        .await
    }
}

#[async_trait]
impl ChatModel for LLMClient {
    /// 先用合适的模型对话，全部重试失败后切换到备选模型
    async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let (befitting_model, fallover_model) =
            evaluate_befitting_model(&self.config, system_prompt, user_prompt);

        match self
            .prompt_with_model(system_prompt, user_prompt, &befitting_model)
            .await
        {
            Ok(response) => Ok(response),
            Err(e) => match fallover_model {
                Some(model) => {
                    tracing::warn!(
                        "❌ 调用模型服务出错，尝试 {} 次均失败，尝试使用备选模型{}...{}",
                        self.config.retry_attempts,
                        model,
                        e
                    );
                    self.prompt_with_model(system_prompt, user_prompt, &model)
                        .await
                }
                None => {
                    tracing::error!(
                        "❌ 调用模型服务出错，尝试 {} 次均失败...{}",
                        self.config.retry_attempts,
                        e
                    );
                    Err(e)
                }
            },
        }
    }
}
