use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::LLMConfig;

/// 超过该长度的prompt直接交给高质量模型
const EFFICIENT_MODEL_PROMPT_LIMIT: usize = 32 * 1024;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid regex"));

/// 允许一层嵌套的花括号对象
static EMBEDDED_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("valid regex")
});

/// 返回(首选模型, 备选模型)
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> (String, Option<String>) {
    if system_prompt.len() + user_prompt.len() <= EFFICIENT_MODEL_PROMPT_LIMIT {
        return (
            llm_config.model_efficient.clone(),
            Some(llm_config.model_powerful.clone()),
        );
    }
    (llm_config.model_powerful.clone(), None)
}

/// 从模型回复中取出JSON对象：代码块 → 整体解析 → 首尾花括号之间 → 正文中第一个对象
pub fn extract_json_object(text: &str) -> Option<Value> {
    if let Some(captures) = FENCED_JSON.captures(text)
        && let Some(body) = captures.get(1)
        && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(body.as_str().trim())
    {
        return Some(value);
    }

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(value);
    }

    // 前后夹杂说明文字、嵌套较深的对象
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
        && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&text[start..=end])
    {
        return Some(value);
    }

    EMBEDDED_OBJECT
        .find_iter(text)
        .find_map(|m| match serde_json::from_str::<Value>(m.as_str()) {
            Ok(value @ Value::Object(_)) => Some(value),
            _ => None,
        })
}
