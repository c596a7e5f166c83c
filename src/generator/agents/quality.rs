use crate::types::TeachingResponse;

/// 低于该分数的结果视为失败，需要重新检索
const RETRY_THRESHOLD: f64 = 0.2;

/// 质量评估 - 按各章节是否齐全打分
#[derive(Debug, Clone, Copy)]
pub struct QualityAssessor {
    max_retries: u32,
}

impl QualityAssessor {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// 完整度得分，满分1.0
    pub fn score(&self, response: &TeachingResponse) -> f64 {
        let mut score = 0.0;
        if !response.tldr.trim().is_empty() {
            score += 0.2;
        }
        if !response.explanation.content.trim().is_empty() {
            score += 0.3;
        }
        if !response.analogy.trim().is_empty() {
            score += 0.2;
        }
        if !response.sources.is_empty() {
            score += 0.2;
        }
        if !response.practice_questions.is_empty() {
            score += 0.1;
        }
        score
    }

    /// 只有几乎完全失败且还有重试次数时才重试
    pub fn should_retry(&self, score: f64, retries: u32) -> bool {
        score < RETRY_THRESHOLD && retries < self.max_retries
    }
}

/// 固定模板的后续问题建议
pub fn follow_up_suggestions(question: &str) -> Vec<String> {
    vec![
        format!(
            "Can you explain more about the key concepts in {}?",
            question.trim()
        ),
        "What are some practical applications of this?".to_string(),
        "How does this relate to other topics?".to_string(),
    ]
}
