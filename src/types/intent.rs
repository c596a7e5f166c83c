use serde::{Deserialize, Serialize};

/// 学生水平
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 问题类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Conceptual,
    Practical,
    Mathematical,
    Mixed,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Conceptual => "conceptual",
            QuestionType::Practical => "practical",
            QuestionType::Mathematical => "mathematical",
            QuestionType::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 问题意图分析结果，由IntentClassifier产出，路由器只读使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub difficulty_level: DifficultyLevel,
    pub question_type: QuestionType,
    pub requires_visuals: bool,
    pub requires_math: bool,
    pub requires_code: bool,
    pub key_concepts: Vec<String>,
    /// 置信度，范围0.0到1.0
    pub confidence: f64,
}

impl IntentAnalysis {
    /// 分类失败时使用的保守默认值
    pub fn fallback() -> Self {
        Self {
            difficulty_level: DifficultyLevel::Intermediate,
            question_type: QuestionType::Conceptual,
            requires_visuals: true,
            requires_math: false,
            requires_code: false,
            key_concepts: vec![],
            confidence: 0.5,
        }
    }

    /// 将置信度限制在[0, 1]区间，NaN按0处理
    pub fn normalized(mut self) -> Self {
        self.confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };
        self
    }
}
