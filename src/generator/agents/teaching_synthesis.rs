use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use regex::Regex;

use crate::cost::CostTracker;
use crate::generator::agents::content_extraction::ExtractedContent;
use crate::llm::client::ChatModel;
use crate::types::{
    DifficultyLevel, ImageData, IntentAnalysis, ResearchRequest, Source, TeachingResponse,
    TeachingSection,
};

/// 每段研究素材写入prompt的字符上限
const RESEARCH_CHARS_PER_SOURCE: usize = 2000;
const MAX_PRACTICE_QUESTIONS: usize = 4;
const MIN_PRACTICE_QUESTIONS: usize = 3;
/// 合成结果在质量评估前的默认置信度
const DEFAULT_CONFIDENCE: f64 = 0.85;

const TLDR_MARKERS: &[&str] = &["## TL;DR", "## TLDR", "**TL;DR**", "TL;DR:", "TL;DR\n", "TL;DR "];
const EXPLANATION_MARKERS: &[&str] = &[
    "## Step-by-Step Explanation",
    "## **Step-by-Step Explanation**",
    "## Explanation",
    "## **Explanation**",
    "## Detailed Explanation",
    "Step-by-Step:",
    "---\n## ",
];
const VISUAL_MARKERS: &[&str] = &[
    "## Visual Explanation",
    "## **Visual Explanation**",
    "## Visuals",
    "Visual Understanding:",
    "Visual Explanation\n",
];
const ANALOGY_MARKERS: &[&str] = &[
    "## Real-World Analogy",
    "## **Real-World Analogy**",
    "## Analogy",
    "Real-World Example:",
    "Real-World Analogy\n",
];
const PRACTICE_MARKERS: &[&str] = &[
    "## Practice Questions",
    "## **Practice Questions**",
    "## Questions",
    "Practice:",
    "Practice Questions\n",
];

const CATEGORY_LABELS: [&str; 6] = [
    "Basic Recall",
    "Understanding",
    "Application",
    "Analysis",
    "Synthesis",
    "Evaluation",
];
const QUESTION_WORDS: [&str; 11] = [
    "what", "how", "why", "when", "where", "who", "explain", "describe", "compare", "calculate",
    "identify",
];

static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{2,3})\s*\d+\.\s+").expect("valid regex"));

fn all_markers() -> impl Iterator<Item = &'static str> {
    [
        TLDR_MARKERS,
        EXPLANATION_MARKERS,
        VISUAL_MARKERS,
        ANALOGY_MARKERS,
        PRACTICE_MARKERS,
    ]
    .into_iter()
    .flatten()
    .copied()
}

/// 从模型回复中解析出的各个章节
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLesson {
    pub tldr: Option<String>,
    pub explanation: Option<String>,
    pub visual_explanation: Option<String>,
    pub analogy: Option<String>,
    pub practice_questions: Vec<String>,
}

/// 合成一课所需的研究素材
#[derive(Debug, Clone, Default)]
pub struct LessonMaterials {
    pub extracted: Vec<ExtractedContent>,
    pub images: Vec<ImageData>,
    /// 与extracted一一对应
    pub sources: Vec<Source>,
    /// 搜索服务商给出的摘要回答
    pub search_summary: Option<String>,
}

/// 教学合成器 - 把研究素材组织成完整的一课
pub struct TeachingSynthesizer {
    llm: Arc<dyn ChatModel>,
}

impl TeachingSynthesizer {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    /// 附件内容只进入合成prompt，练习题兜底只看学生的原始问题
    pub async fn synthesize(
        &self,
        request: &ResearchRequest,
        intent: &IntentAnalysis,
        materials: LessonMaterials,
        cost: &CostTracker,
    ) -> Result<TeachingResponse> {
        let LessonMaterials {
            extracted,
            images,
            sources,
            search_summary,
        } = materials;
        let question = request.enriched_question();
        tracing::info!(
            "🤖 合成教学内容: {}...",
            question.chars().take(50).collect::<String>()
        );

        let prompt_sys = format!(
            "{}\n\n{}",
            include_str!("prompts/teaching_synthesis_sys.tpl"),
            difficulty_instructions(intent.difficulty_level)
        );
        let prompt_user = format!(
            include_str!("prompts/teaching_synthesis_user.tpl"),
            question,
            intent.difficulty_level,
            intent.question_type,
            intent.key_concepts.join(", "),
            format_research(&extracted, &sources, search_summary.as_deref()),
            images.len(),
            format_image_references(&images)
        );

        cost.record_llm_call();
        let content = self
            .llm
            .prompt(&prompt_sys, &prompt_user)
            .await
            .context("教学内容生成失败")?;
        tracing::info!("模型回复长度: {}个字符", content.chars().count());

        let parsed = parse_teaching_content(&content);

        let practice_questions = if parsed.practice_questions.len() < MIN_PRACTICE_QUESTIONS {
            tracing::warn!(
                "练习题只有{}道，单独生成练习题",
                parsed.practice_questions.len()
            );
            self.generate_practice_questions(request.question.trim(), intent.difficulty_level, cost)
                .await
        } else {
            parsed.practice_questions
        };
        let practice_questions = dedup_questions(practice_questions, 0);

        for (idx, q) in practice_questions.iter().enumerate() {
            tracing::debug!("  Q{}: {}", idx + 1, q.chars().take(80).collect::<String>());
        }

        tracing::info!("✅ 教学内容合成完成");
        Ok(TeachingResponse {
            question: request.question.clone(),
            tldr: parsed.tldr.unwrap_or_default(),
            explanation: TeachingSection {
                title: "Explanation".to_string(),
                content: parsed.explanation.unwrap_or_default(),
            },
            visual_explanation: parsed.visual_explanation,
            images,
            analogy: parsed.analogy.unwrap_or_default(),
            practice_questions,
            sources,
            difficulty_level: intent.difficulty_level,
            confidence_score: DEFAULT_CONFIDENCE,
            processing_time: 0.0,
            follow_up_suggestions: vec![],
            cost: None,
            slides: None,
        })
    }

    /// 单独请求4道练习题，不足时用固定问题补齐
    async fn generate_practice_questions(
        &self,
        question: &str,
        difficulty: DifficultyLevel,
        cost: &CostTracker,
    ) -> Vec<String> {
        let prompt_user = format!(
            include_str!("prompts/practice_questions_user.tpl"),
            difficulty, question
        );

        cost.record_llm_call();
        let response = match self
            .llm
            .prompt("You write practice questions for students.", &prompt_user)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ 练习题生成失败: {}", e);
                return vec![
                    "What are the key concepts you learned?".to_string(),
                    "How would you apply this knowledge in a real scenario?".to_string(),
                    "Can you explain this concept to someone else?".to_string(),
                ];
            }
        };

        let generated: Vec<String> = response
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()) || line.starts_with('-'))
            .map(|line| strip_list_prefix(line).to_string())
            .collect();
        let mut questions = dedup_questions(generated, 15);

        let tail: Vec<&str> = question.split_whitespace().rev().take(3).collect();
        let tail: Vec<&str> = tail.into_iter().rev().collect();
        let fallbacks = [
            format!("What are the key principles behind {}?", tail.join(" ")),
            "How would you apply this knowledge in a practical scenario?".to_string(),
            "Why is this concept important in the broader field?".to_string(),
            "What connections can you make to other topics you've learned?".to_string(),
        ];
        let mut seen: HashSet<String> = questions.iter().map(|q| normalize_question(q)).collect();
        for fallback in fallbacks {
            if questions.len() >= MAX_PRACTICE_QUESTIONS {
                break;
            }
            if seen.insert(normalize_question(&fallback)) {
                questions.push(fallback);
            }
        }
        questions
    }
}

fn difficulty_instructions(level: DifficultyLevel) -> &'static str {
    match level {
        DifficultyLevel::Beginner => include_str!("prompts/teaching_beginner.tpl"),
        DifficultyLevel::Intermediate => include_str!("prompts/teaching_intermediate.tpl"),
        DifficultyLevel::Advanced => include_str!("prompts/teaching_advanced.tpl"),
    }
}

fn format_research(
    extracted: &[ExtractedContent],
    sources: &[Source],
    search_summary: Option<&str>,
) -> String {
    let sections = extracted
        .iter()
        .zip(sources)
        .enumerate()
        .map(|(idx, (item, source))| {
            let content: String = item.content.chars().take(RESEARCH_CHARS_PER_SOURCE).collect();
            format!("[{}] {}: {}", idx + 1, source.domain, content)
        });
    search_summary
        .map(|answer| format!("[Search summary] {}", answer))
        .into_iter()
        .chain(sections)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_image_references(images: &[ImageData]) -> String {
    if images.is_empty() {
        return String::new();
    }
    let references: Vec<String> = images
        .iter()
        .enumerate()
        .map(|(idx, image)| format!("**Visual {}**: {}", idx + 1, image.caption))
        .collect();
    format!(
        "\n## Visual Content Available\nReference these visual aids naturally in your explanation:\n\n{}",
        references.join("\n")
    )
}

/// 按章节标记切分模型回复
pub fn parse_teaching_content(content: &str) -> ParsedLesson {
    let lesson = ParsedLesson {
        tldr: section_body(content, TLDR_MARKERS).map(|s| clean_prose(&s)),
        explanation: section_body(content, EXPLANATION_MARKERS).map(|s| clean_prose(&s)),
        visual_explanation: section_body(content, VISUAL_MARKERS).map(|s| clean_prose(&s)),
        analogy: section_body(content, ANALOGY_MARKERS).map(|s| clean_prose(&s)),
        practice_questions: section_body(content, PRACTICE_MARKERS)
            .map(|s| parse_practice_questions(&s))
            .unwrap_or_default(),
    };

    if lesson == ParsedLesson::default() {
        tracing::error!(
            "没有解析到任何章节，回复开头: {}",
            content.chars().take(200).collect::<String>()
        );
    }
    lesson
}

/// 取第一个出现的标记之后、下一个任意标记之前的内容
fn section_body(content: &str, markers: &[&str]) -> Option<String> {
    let (pos, marker) = markers
        .iter()
        .find_map(|marker| content.find(marker).map(|pos| (pos, *marker)))?;
    let start = pos + marker.len();
    let end = all_markers()
        .filter_map(|next| content[start..].find(next).map(|p| start + p))
        .min()
        .unwrap_or(content.len());

    let mut body = content[start..end].trim();
    if let Some(rest) = body.strip_prefix("---") {
        body = rest.trim();
    }
    Some(body.replace("\n---\n", "\n\n"))
}

fn clean_prose(section: &str) -> String {
    let section = if section.starts_with('#') {
        section
            .split_once('\n')
            .map(|(_, rest)| rest.trim())
            .unwrap_or_default()
    } else {
        section
    };
    NUMBERED_HEADING.replace_all(section, "$1 ").into_owned()
}

fn parse_practice_questions(section: &str) -> Vec<String> {
    let mut questions = vec![];

    for line in section.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("##") {
            continue;
        }
        if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
            continue;
        }

        if line.starts_with('*') && line.ends_with('*') && line.chars().count() > 15 {
            let q = line.trim_matches('*').trim();
            if q.contains('?') {
                let q = q.split("(Answer:").next().unwrap_or(q).trim();
                questions.push(q.to_string());
            }
        } else if line.starts_with(|c: char| c.is_ascii_digit())
            || line.starts_with('-')
            || line.starts_with('•')
        {
            let q = strip_list_prefix(line);
            if q.chars().count() <= 15 {
                continue;
            }
            if q.starts_with("**") && q.ends_with("**") {
                continue;
            }
            let is_category_label = CATEGORY_LABELS.iter().any(|label| q.contains(label))
                && (q.contains('/') || (q.chars().count() < 50 && !q.contains('?')));
            if is_category_label {
                continue;
            }
            let lowered = q.to_lowercase();
            if !q.contains('?') && !QUESTION_WORDS.iter().any(|w| lowered.contains(w)) {
                continue;
            }
            questions.push(q.trim_matches('*').trim().to_string());
        }
    }

    dedup_questions(questions, 10)
}

fn strip_list_prefix(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_ascii_digit() || ".-•) ".contains(c))
        .trim()
}

/// 小写、去标点、合并空白后的比较键
pub fn normalize_question(question: &str) -> String {
    question
        .to_lowercase()
        .replace(['?', '.', ',', '!'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 按规范化文本去重，只保留长度超过min_chars的问题，最多4道
fn dedup_questions(questions: Vec<String>, min_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|q| q.chars().count() > min_chars)
        .filter(|q| {
            let fresh = seen.insert(normalize_question(q));
            if !fresh {
                tracing::debug!("移除重复练习题: {}", q.chars().take(60).collect::<String>());
            }
            fresh
        })
        .take(MAX_PRACTICE_QUESTIONS)
        .collect()
}
