use crate::config::{Config, LLMProvider};
use crate::types::ResearchRequest;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// TeachFlow - 由Rust与AI驱动的研究型教学助手
#[derive(Parser, Debug)]
#[command(name = "teachflow")]
#[command(
    about = "AI-based research tutor: searches the web for a question, extracts the relevant material and writes a lesson adapted to the learner's level."
)]
#[command(version)]
pub struct Args {
    /// 学习者的问题
    pub question: String,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 附带图片的文字描述
    #[arg(long)]
    pub image_context: Option<String>,

    /// 附带文档的路径，文本内容会作为问题的补充上下文
    #[arg(long)]
    pub file_context: Option<PathBuf>,

    /// 无论问题类型如何都检索图片
    #[arg(long)]
    pub force_images: bool,

    /// 是否禁用缓存
    #[arg(long)]
    pub no_cache: bool,

    /// 额外生成N页幻灯片（6-18页）
    #[arg(long, value_name = "N")]
    pub slides: Option<usize>,

    /// LLM Provider (openai, mistral, openrouter, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 高能效模型，用于意图识别、内容提炼等常规任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，作为efficient失效情况下的兜底
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// Tavily API KEY
    #[arg(long)]
    pub tavily_api_key: Option<String>,

    /// 质量不达标时的最大重试次数
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 根据问题与附加上下文构造请求
    pub fn to_request(&self) -> Result<ResearchRequest> {
        let file_context = match &self.file_context {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file context: {:?}", path))?,
            ),
            None => None,
        };

        Ok(ResearchRequest {
            question: self.question.clone(),
            image_context: self.image_context.clone(),
            file_context,
        })
    }

    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            // 显式指定的配置文件必须可读
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("teachflow.toml");

                if default_config_path.exists() {
                    Config::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                // 日志尚未初始化
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider {}",
                    provider_str, config.llm.provider
                ),
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }

        // 检索与缓存配置
        if let Some(tavily_api_key) = self.tavily_api_key {
            config.search.tavily_api_key = tavily_api_key;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }

        // 其他配置
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if self.slides.is_some() {
            config.slides = self.slides;
        }
        config.force_images |= self.force_images;
        config.verbose |= self.verbose;

        Ok(config)
    }
}

// Include tests
#[cfg(test)]
mod tests;
