//! 搜索路由器 - 基于意图分析的查询规划与成本控制
//!
//! 不额外调用LLM，仅根据已经算好的IntentAnalysis和问题文本的简单启发式
//! 给出SearchPlan，决定搜索深度、结果数、查询条数、是否抓取全文、域名过滤和配图。

use crate::types::{
    DifficultyLevel, IntentAnalysis, QuestionType, SearchComplexity, SearchDepth, SearchPlan,
    SearchTopic,
};

/// 教学价值较低的站点（社交、短视频平台）
pub const LOW_QUALITY_DOMAINS: [&str; 6] = [
    "pinterest.com",
    "quora.com",
    "tiktok.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
];

/// 各复杂度档位对应的预设参数
struct PlanPreset {
    search_depth: SearchDepth,
    max_results: usize,
    num_queries: usize,
    include_raw_content: bool,
    context_budget_chars: usize,
}

impl PlanPreset {
    fn for_complexity(complexity: SearchComplexity) -> Self {
        match complexity {
            SearchComplexity::Simple => Self {
                search_depth: SearchDepth::Basic,
                max_results: 3,
                num_queries: 1,
                include_raw_content: false,
                context_budget_chars: 4000,
            },
            SearchComplexity::Moderate => Self {
                search_depth: SearchDepth::Basic,
                max_results: 5,
                num_queries: 2,
                include_raw_content: false,
                context_budget_chars: 6000,
            },
            SearchComplexity::Complex => Self {
                search_depth: SearchDepth::Advanced,
                max_results: 7,
                num_queries: 3,
                include_raw_content: true,
                context_budget_chars: 12000,
            },
        }
    }
}

/// 零延迟的搜索路由器
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchRouter;

impl SearchRouter {
    pub fn new() -> Self {
        Self
    }

    /// 复杂度分级，SIMPLE先于COMPLEX判断
    pub fn classify_complexity(
        &self,
        intent: Option<&IntentAnalysis>,
        query: &str,
    ) -> SearchComplexity {
        // 没有意图信息时取中间档
        let Some(intent) = intent else {
            return SearchComplexity::Moderate;
        };

        let word_count = query.split_whitespace().count();

        let is_simple = intent.confidence >= 0.75
            && intent.difficulty_level == DifficultyLevel::Beginner
            && matches!(
                intent.question_type,
                QuestionType::Conceptual | QuestionType::Practical
            )
            && intent.key_concepts.len() <= 2
            && word_count <= 15;
        if is_simple {
            return SearchComplexity::Simple;
        }

        let is_complex = intent.difficulty_level == DifficultyLevel::Advanced
            || intent.question_type == QuestionType::Mathematical
            || (intent.requires_math && intent.requires_code)
            || intent.key_concepts.len() >= 5
            || word_count > 40;
        if is_complex {
            return SearchComplexity::Complex;
        }

        SearchComplexity::Moderate
    }

    /// 选择域名过滤列表，返回(include, exclude)
    ///
    /// include目前始终为空，为后续按学科设置白名单预留。
    pub fn select_domains(&self, _intent: Option<&IntentAnalysis>) -> (Vec<String>, Vec<String>) {
        let exclude = LOW_QUALITY_DOMAINS.iter().map(|d| d.to_string()).collect();
        (vec![], exclude)
    }

    /// 为问题生成搜索计划，相同输入总是得到相同计划
    pub fn plan(
        &self,
        query: &str,
        intent: Option<&IntentAnalysis>,
        force_images: bool,
    ) -> SearchPlan {
        let complexity = self.classify_complexity(intent, query);
        let (include_domains, exclude_domains) = self.select_domains(intent);
        let include_images = force_images || intent.is_none_or(|i| i.requires_visuals);
        let preset = PlanPreset::for_complexity(complexity);

        let plan = SearchPlan {
            complexity,
            search_depth: preset.search_depth,
            max_results: preset.max_results,
            num_queries: preset.num_queries,
            include_raw_content: preset.include_raw_content,
            include_images,
            include_answer: true,
            include_domains,
            exclude_domains,
            topic: SearchTopic::General,
            time_range: None,
            context_budget_chars: preset.context_budget_chars,
        };

        tracing::info!(
            complexity = %plan.complexity,
            depth = %plan.search_depth,
            max_results = plan.max_results,
            queries = plan.num_queries,
            raw_content = plan.include_raw_content,
            images = plan.include_images,
            "🧭 搜索计划: 预估成本系数 {:.1}x",
            plan.estimated_cost_weight()
        );
        plan
    }

    /// 按计划生成查询，去重后条数可能少于num_queries（不回填）
    pub fn generate_queries(
        &self,
        original_question: &str,
        intent: Option<&IntentAnalysis>,
        plan: &SearchPlan,
    ) -> Vec<String> {
        let concepts: &[String] = intent.map(|i| i.key_concepts.as_slice()).unwrap_or(&[]);
        let mut queries = vec![original_question.to_string()];

        match plan.num_queries {
            0 | 1 => {}
            2 => {
                if concepts.is_empty() {
                    queries.push(format!("{} tutorial explanation", original_question));
                } else {
                    queries.push(format!(
                        "{} explained with examples",
                        join_top(concepts, 3)
                    ));
                }
            }
            _ => {
                if concepts.is_empty() {
                    queries.push(format!("{} detailed explanation", original_question));
                } else {
                    queries.push(format!("{} in-depth explanation", join_top(concepts, 2)));
                }

                let suffix = match intent {
                    Some(i) if i.requires_math => "formula derivation proof",
                    Some(i) if i.requires_code => "code implementation example",
                    Some(i) if i.requires_visuals => "diagram visual illustration",
                    _ => "examples applications",
                };
                queries.push(format!("{} {}", original_question, suffix));
            }
        }

        let mut seen = std::collections::HashSet::new();
        let mut unique: Vec<String> = queries
            .into_iter()
            .filter(|q| seen.insert(q.trim().to_lowercase()))
            .collect();
        unique.truncate(plan.num_queries.max(1));
        unique
    }
}

fn join_top(concepts: &[String], n: usize) -> String {
    concepts
        .iter()
        .take(n)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
