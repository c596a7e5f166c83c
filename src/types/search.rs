use serde::{Deserialize, Serialize};

/// 一次搜索应投入的力度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchComplexity {
    /// 单一事实或定义查询
    Simple,
    /// 多角度的教学类问题
    Moderate,
    /// 深度调研与综合
    Complex,
}

impl std::fmt::Display for SearchComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchComplexity::Simple => write!(f, "simple"),
            SearchComplexity::Moderate => write!(f, "moderate"),
            SearchComplexity::Complex => write!(f, "complex"),
        }
    }
}

/// 搜索深度，advanced对应服务商最彻底也最昂贵的档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(SearchDepth::Basic),
            "advanced" => Ok(SearchDepth::Advanced),
            _ => Err(format!("Unknown search depth: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
}

/// 路由器为一个问题给出的完整搜索参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPlan {
    pub complexity: SearchComplexity,
    pub search_depth: SearchDepth,
    /// 单次查询的结果上限
    pub max_results: usize,
    /// 需要发出的查询条数
    pub num_queries: usize,
    /// 是否抓取网页全文
    pub include_raw_content: bool,
    pub include_images: bool,
    /// 是否请求服务商内置的答案摘要
    pub include_answer: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub topic: SearchTopic,
    /// 例如 "week"、"month"、"year"
    pub time_range: Option<String>,
    /// 每条结果保留的最大字符数
    pub context_budget_chars: usize,
}

impl SearchPlan {
    /// 相对成本系数（1.0为最便宜的基准）
    pub fn estimated_cost_weight(&self) -> f64 {
        let mut weight = 1.0;
        if self.search_depth == SearchDepth::Advanced {
            weight *= 2.0;
        }
        weight *= self.num_queries as f64;
        if self.include_raw_content {
            weight *= 1.5;
        }
        weight
    }
}

/// 规范化后的网页搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
    #[serde(default)]
    pub images: Vec<String>,
    /// 服务商生成的摘要回答，只挂在第一条结果上
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}
