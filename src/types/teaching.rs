use serde::{Deserialize, Serialize};

use crate::cost::CostSummary;
use crate::types::intent::DifficultyLevel;
use crate::types::slides::SlideDeck;

/// 附加文档内容进入问题时保留的最大字符数
const FILE_CONTEXT_LIMIT: usize = 5000;

/// 一次教学请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub question: String,
    /// 用户附带图片的文字描述
    pub image_context: Option<String>,
    /// 用户附带文档中提取出的文本
    pub file_context: Option<String>,
}

impl ResearchRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// 把附加的图片和文档上下文拼接到问题后面
    pub fn enriched_question(&self) -> String {
        let mut question = self.question.trim().to_string();
        if let Some(image_context) = self.image_context.as_deref()
            && !image_context.trim().is_empty()
        {
            question.push_str(&format!(
                "\n\n[User attached an image with the following content: {}]",
                image_context.trim()
            ));
        }
        if let Some(file_context) = self.file_context.as_deref()
            && !file_context.trim().is_empty()
        {
            let truncated: String = file_context.chars().take(FILE_CONTEXT_LIMIT).collect();
            question.push_str(&format!(
                "\n\n[User attached a document with the following content:\n{}]",
                truncated
            ));
        }
        question
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Article,
    Academic,
    Video,
    Documentation,
    #[default]
    Other,
}

/// 引用来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub domain: String,
    pub relevance_score: f64,
    pub source_type: SourceType,
    pub published_date: Option<String>,
}

/// 入选的配图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub url: String,
    pub caption: String,
    pub alt_text: Option<String>,
    pub relevance_score: f64,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingSection {
    pub title: String,
    pub content: String,
}

/// 最终的教学响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingResponse {
    pub question: String,
    pub tldr: String,
    pub explanation: TeachingSection,
    pub visual_explanation: Option<String>,
    pub images: Vec<ImageData>,
    pub analogy: String,
    pub practice_questions: Vec<String>,
    pub sources: Vec<Source>,
    pub difficulty_level: DifficultyLevel,
    pub confidence_score: f64,
    /// 处理耗时（秒）
    pub processing_time: f64,
    pub follow_up_suggestions: Vec<String>,
    pub cost: Option<CostSummary>,
    /// 单独写入`<slug>.slides.json`
    #[serde(skip)]
    pub slides: Option<SlideDeck>,
}
