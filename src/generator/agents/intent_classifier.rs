use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::cost::CostTracker;
use crate::llm::client::{ChatModel, utils::extract_json_object};
use crate::types::IntentAnalysis;

/// 意图分类器 - 判断问题的难度、类型以及需要的呈现方式
pub struct IntentClassifier {
    llm: Arc<dyn ChatModel>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    /// 分析问题意图，任何失败都退化为保守默认值
    pub async fn analyze(&self, question: &str, cost: &CostTracker) -> IntentAnalysis {
        tracing::info!(
            "🤖 分析问题意图: {}...",
            question.chars().take(100).collect::<String>()
        );

        match self.classify(question, cost).await {
            Ok(intent) => {
                tracing::info!(
                    difficulty = %intent.difficulty_level,
                    question_type = %intent.question_type,
                    confidence = intent.confidence,
                    "✅ 意图分析完成"
                );
                intent
            }
            Err(e) => {
                tracing::error!("❌ 意图分析失败，使用默认意图: {:#}", e);
                IntentAnalysis::fallback()
            }
        }
    }

    async fn classify(&self, question: &str, cost: &CostTracker) -> Result<IntentAnalysis> {
        let prompt_sys = include_str!("prompts/intent_classifier_sys.tpl");
        let prompt_user = format!(include_str!("prompts/intent_classifier_user.tpl"), question);

        cost.record_llm_call();
        let response = self.llm.prompt(prompt_sys, &prompt_user).await?;
        tracing::debug!(
            "意图分析原始回复: {}",
            response.chars().take(200).collect::<String>()
        );

        parse_intent(&response)
    }
}

/// 解析模型回复中的意图JSON
pub fn parse_intent(response: &str) -> Result<IntentAnalysis> {
    let value = extract_json_object(response)
        .ok_or_else(|| anyhow!("回复中没有找到JSON对象"))?;
    let intent: IntentAnalysis = serde_json::from_value(value)?;
    Ok(intent.normalized())
}
