use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    /// OpenAI及兼容OpenAI协议的服务（如Groq），通过api_base_url切换
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 输出路径
    pub output_path: PathBuf,

    /// 费用日志路径，为空时不落盘
    pub cost_log_path: Option<PathBuf>,

    /// 质量不达标时的最大重试次数
    pub max_retries: u32,

    /// 强制请求配图
    pub force_images: bool,

    /// 幻灯片页数，为空时不生成幻灯片
    pub slides: Option<usize>,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网页搜索配置
    pub search: SearchConfig,

    /// 搜索缓存配置
    pub cache: CacheConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，用于意图分类、内容提取等常规任务
    pub model_efficient: String,

    /// 高质量模型，用于长上下文的教学合成，以及作为efficient失效情况下的兜底
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 网页搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Tavily API KEY
    pub tavily_api_key: String,

    /// Tavily API地址
    pub api_base_url: String,

    /// 没有搜索计划时的结果数上限
    pub max_search_results: usize,

    /// 单次响应附带的图片上限
    pub max_images_per_response: usize,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存过期时间（秒）
    pub ttl_seconds: u64,

    /// 最大条目数
    pub max_size: usize,

    /// 每写入N次做一次过期清扫，0表示只做惰性过期
    pub sweep_every_writes: u64,
}

impl Config {
    /// 未设置RUST_LOG时使用的日志级别
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./teachflow.out"),
            cost_log_path: None,
            max_retries: 3,
            force_images: false,
            slides: None,
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            cache: CacheConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("TEACHFLOW_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.mistral.ai/v1"),
            model_efficient: String::from("mistral-small-latest"),
            model_powerful: String::from("mistral-medium-latest"),
            max_tokens: 8000,
            temperature: 0.2,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            timeout_seconds: 60,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            max_search_results: 10,
            max_images_per_response: 6,
            timeout_seconds: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            max_size: 256,
            sweep_every_writes: 0,
        }
    }
}
