use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use serde_json::Value;

use crate::cost::CostTracker;
use crate::llm::client::{ChatModel, utils::extract_json_object};
use crate::types::{IntentAnalysis, Slide, SlideDeck, SlideLayout};

const MIN_SLIDES: usize = 6;
const MAX_SLIDES: usize = 18;
const MAX_ATTEMPTS: usize = 3;
const DEFAULT_BACKGROUND: &str = "gradient";
/// 每页预估讲解时长（分钟）
const MINUTES_PER_SLIDE: u32 = 2;

/// 模型常把要点写成这些字段下的嵌套结构
const NESTED_BULLET_KEYS: [&str; 8] = [
    "left_column",
    "right_column",
    "column_1",
    "column_2",
    "points",
    "items",
    "bullets",
    "content",
];
const HEADING_KEYS: [&str; 3] = ["column", "header", "title"];

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•–—]\s*").expect("valid regex"));

struct SlideTemplate {
    title: &'static str,
    bullets: [&'static str; 4],
    notes: &'static str,
    layout: SlideLayout,
    image_suffix: &'static str,
}

/// 模型不可用时按顺序循环使用的内容页模板，`{topic}`会被替换为主题
const SLIDE_TEMPLATES: [SlideTemplate; 12] = [
    SlideTemplate {
        title: "What is {topic}?",
        bullets: [
            "Definition and overview of {topic}",
            "Why {topic} matters in today's world",
            "Historical background and evolution",
            "Key areas we will cover",
        ],
        notes: "Let's begin by understanding what {topic} actually is. At its core, {topic} is a fascinating subject that has shaped many aspects of our world. Understanding the basics will help us appreciate the more advanced concepts we'll explore later.",
        layout: SlideLayout::Default,
        image_suffix: "introduction overview",
    },
    SlideTemplate {
        title: "Core Fundamentals of {topic}",
        bullets: [
            "Fundamental principles and building blocks",
            "Key terminology you need to know",
            "The underlying mechanisms at work",
            "How these fundamentals connect together",
        ],
        notes: "Now let's dive into the core fundamentals. Think of these as the building blocks: without them, the more advanced ideas won't make much sense. Just like learning an alphabet before writing essays, mastering these basics is essential.",
        layout: SlideLayout::Default,
        image_suffix: "fundamentals diagram",
    },
    SlideTemplate {
        title: "How {topic} Works",
        bullets: [
            "Step-by-step process explained",
            "Key components and their roles",
            "The flow from input to output",
            "Critical interactions between elements",
        ],
        notes: "So how does {topic} actually work? Let me walk you through the process step by step. Each component plays a specific role, and understanding those roles helps us see the bigger picture.",
        layout: SlideLayout::Default,
        image_suffix: "process diagram",
    },
    SlideTemplate {
        title: "Key Concepts in {topic}",
        bullets: [
            "Essential theories and frameworks",
            "Important models and approaches",
            "Relationships between concepts",
            "Common misconceptions clarified",
        ],
        notes: "These key concepts form the intellectual backbone of {topic}. Many students find it helpful to build a mental model linking these ideas together. Don't worry if some seem abstract at first; we'll ground them with concrete examples shortly.",
        layout: SlideLayout::Default,
        image_suffix: "concepts mind map",
    },
    SlideTemplate {
        title: "Real-World Examples",
        bullets: [
            "Practical example: everyday applications",
            "Case study: industry implementation",
            "How experts apply these concepts",
            "Lessons learned from real scenarios",
        ],
        notes: "Let's bring {topic} to life with real-world examples. Theory is important, but seeing how it applies in practice makes everything click. These examples show just how versatile {topic} can be.",
        layout: SlideLayout::ImageFocus,
        image_suffix: "real world example",
    },
    SlideTemplate {
        title: "Benefits & Advantages",
        bullets: [
            "Key benefits of understanding {topic}",
            "Competitive advantages it provides",
            "Long-term impact and value creation",
            "How it improves existing systems",
        ],
        notes: "Understanding {topic} unlocks several significant advantages. Whether you're a student or a professional, these benefits translate directly into real value. Let me highlight the most impactful ones.",
        layout: SlideLayout::Default,
        image_suffix: "benefits advantages",
    },
    SlideTemplate {
        title: "Challenges & Considerations",
        bullets: [
            "Common challenges and obstacles",
            "Potential pitfalls to avoid",
            "Strategies to overcome difficulties",
            "Important trade-offs to consider",
        ],
        notes: "No topic is without its challenges, and {topic} is no exception. Being aware of them upfront helps you prepare and navigate them successfully. Think of them as opportunities to deepen your understanding.",
        layout: SlideLayout::Comparison,
        image_suffix: "challenges solutions",
    },
    SlideTemplate {
        title: "Applications of {topic}",
        bullets: [
            "Applications in science and technology",
            "Industrial and commercial use cases",
            "Educational and research applications",
            "Emerging and future applications",
        ],
        notes: "The applications of {topic} span many domains and industries. From cutting-edge research to everyday tools, the impact is far-reaching. Let's explore some of the most practical ways {topic} is used right now.",
        layout: SlideLayout::Default,
        image_suffix: "applications technology",
    },
    SlideTemplate {
        title: "Deep Dive: Advanced Aspects",
        bullets: [
            "Advanced techniques and methodologies",
            "Expert-level insights and patterns",
            "Cutting-edge research frontiers",
            "Complex interactions and nuances",
        ],
        notes: "For those ready to go deeper, let's explore some advanced aspects of {topic}. These ideas build on everything we've covered so far. Don't worry if they take a bit more time to digest; that's perfectly normal.",
        layout: SlideLayout::Default,
        image_suffix: "advanced concepts",
    },
    SlideTemplate {
        title: "Comparing Approaches",
        bullets: [
            "Different schools of thought",
            "Traditional vs modern approaches",
            "Strengths and weaknesses of each",
            "When to use which approach",
        ],
        notes: "An important skill is knowing the different approaches and when to use each one. Let's compare the major methods side by side, so you can make better decisions when working with {topic} in practice.",
        layout: SlideLayout::Comparison,
        image_suffix: "comparison chart",
    },
    SlideTemplate {
        title: "Future of {topic}",
        bullets: [
            "Emerging trends and directions",
            "Predicted developments and innovations",
            "How the field is evolving",
            "Skills needed for the future",
        ],
        notes: "Where is {topic} heading? New developments are emerging rapidly, and understanding these trends helps you stay ahead. Let me share some of the most promising directions people are exploring.",
        layout: SlideLayout::Default,
        image_suffix: "future trends innovation",
    },
    SlideTemplate {
        title: "Best Practices & Tips",
        bullets: [
            "Industry-proven best practices",
            "Tips from experienced practitioners",
            "Common mistakes to avoid",
            "Quick-win strategies for success",
        ],
        notes: "Before we wrap up, let me share some battle-tested best practices. These tips can save you significant time and effort. Think of them as your personal cheat sheet for mastering {topic}.",
        layout: SlideLayout::Default,
        image_suffix: "best practices tips",
    },
];

/// 幻灯片生成器 - 把一课的主题整理成带口述稿的讲义
pub struct SlideGenerator {
    llm: Arc<dyn ChatModel>,
}

impl SlideGenerator {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    /// 生成幻灯片；页数限制在6到18之间，多次失败后使用模板
    pub async fn generate(
        &self,
        topic: &str,
        num_slides: usize,
        intent: &IntentAnalysis,
        cost: &CostTracker,
    ) -> SlideDeck {
        let num_slides = num_slides.clamp(MIN_SLIDES, MAX_SLIDES);
        let prompt_user = format!(
            include_str!("prompts/slide_generation_user.tpl"),
            topic,
            num_slides,
            intent.difficulty_level,
            intent.key_concepts.join(", ")
        );

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            tracing::info!(
                "🎞️ 生成{}页幻灯片: {} (第{}次尝试)",
                num_slides,
                topic,
                attempt
            );
            cost.record_llm_call();
            match self.request_deck(&prompt_user, topic).await {
                Ok(deck) => {
                    tracing::info!("✅ 幻灯片生成完成，共{}页", deck.total_slides);
                    return deck;
                }
                Err(e) => {
                    tracing::warn!("⚠️ 幻灯片生成失败 (第{}次尝试): {:#}", attempt, e);
                    last_error = Some(e);
                }
            }
        }

        tracing::error!(
            "❌ {}次尝试均失败，使用模板幻灯片: {}",
            MAX_ATTEMPTS,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        );
        fallback_deck(topic, num_slides)
    }

    async fn request_deck(&self, prompt_user: &str, topic: &str) -> Result<SlideDeck> {
        let response = self
            .llm
            .prompt(include_str!("prompts/slide_generation_sys.tpl"), prompt_user)
            .await?;
        let value =
            extract_json_object(&response).ok_or_else(|| anyhow!("模型回复中没有JSON对象"))?;
        parse_slide_deck(&value, topic)
    }
}

/// 把模型返回的JSON转换为幻灯片，少于2页视为失败
pub fn parse_slide_deck(value: &Value, topic: &str) -> Result<SlideDeck> {
    let raw_slides = value["slides"]
        .as_array()
        .ok_or_else(|| anyhow!("缺少slides字段"))?;
    if raw_slides.len() < 2 {
        bail!("幻灯片太少: {}", raw_slides.len());
    }

    let slides: Vec<Slide> = raw_slides
        .iter()
        .enumerate()
        .map(|(idx, raw)| Slide {
            slide_number: raw["slide_number"]
                .as_u64()
                .map_or(idx + 1, |n| n as usize),
            title: raw["title"].as_str().unwrap_or_default().replace("**", ""),
            bullet_points: normalize_bullets(&raw["bullet_points"]),
            speaker_notes: strip_markdown(raw["speaker_notes"].as_str().unwrap_or_default()),
            image_query: raw["image_query"]
                .as_str()
                .map(str::trim)
                .filter(|query| !query.is_empty())
                .unwrap_or(topic)
                .to_string(),
            layout: SlideLayout::parse(raw["layout"].as_str().unwrap_or_default()),
            background_style: raw["background_style"]
                .as_str()
                .unwrap_or(DEFAULT_BACKGROUND)
                .to_string(),
        })
        .collect();

    let estimated = value["estimated_duration_minutes"]
        .as_u64()
        .map_or(slides.len() as u32 * MINUTES_PER_SLIDE, |m| m as u32);
    Ok(SlideDeck {
        title: value["title"].as_str().unwrap_or(topic).to_string(),
        subtitle: value["subtitle"].as_str().unwrap_or_default().to_string(),
        total_slides: slides.len(),
        estimated_duration_minutes: estimated,
        slides,
    })
}

/// 把各种嵌套形状的要点拍平成去重后的纯文本列表
pub fn normalize_bullets(raw: &Value) -> Vec<String> {
    let mut bullets = vec![];
    collect_bullets(raw, &mut bullets);

    let mut seen = HashSet::new();
    bullets.retain(|bullet| seen.insert(bullet.clone()));
    bullets
}

fn collect_bullets(item: &Value, out: &mut Vec<String>) {
    match item {
        Value::String(text) => {
            let cleaned = clean_bullet(text);
            if !cleaned.is_empty() {
                out.push(cleaned);
            }
        }
        Value::Array(items) => {
            for sub in items {
                collect_bullets(sub, out);
            }
        }
        Value::Object(map) => {
            for key in NESTED_BULLET_KEYS {
                match map.get(key) {
                    Some(Value::Array(items)) => {
                        for sub in items {
                            collect_bullets(sub, out);
                        }
                    }
                    Some(text @ Value::String(_)) => collect_bullets(text, out),
                    _ => {}
                }
            }
            // {"column": "标题", "points": [...]}这类结构的标题也保留
            if let Some(heading) = HEADING_KEYS
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find(|heading| !heading.trim().is_empty())
            {
                collect_bullets(&Value::String(heading.to_string()), out);
            }
            if let Some(text @ Value::String(_)) = map.get("text") {
                collect_bullets(text, out);
            }
        }
        _ => {}
    }
}

fn clean_bullet(text: &str) -> String {
    let text = BOLD.replace_all(text.trim(), "$1");
    let text = strip_markdown(&text);
    BULLET_PREFIX.replace(text.trim(), "").trim().to_string()
}

fn strip_markdown(text: &str) -> String {
    text.replace(['*', '#', '`'], "")
}

/// 模板幻灯片：标题页 + 循环使用的内容页 + 总结页
pub fn fallback_deck(topic: &str, num_slides: usize) -> SlideDeck {
    let num_slides = num_slides.clamp(MIN_SLIDES, MAX_SLIDES);
    let topic = topic.trim();
    let deck_title = if topic == topic.to_lowercase() {
        title_case(topic)
    } else {
        topic.to_string()
    };
    let fill = |text: &str| text.replace("{topic}", topic);

    let mut slides = Vec::with_capacity(num_slides);
    slides.push(Slide {
        slide_number: 1,
        title: deck_title.clone(),
        bullet_points: vec![
            format!("A comprehensive guide to {}", topic),
            "From fundamentals to advanced concepts".to_string(),
        ],
        speaker_notes: format!(
            "Welcome everyone! Today we're going to explore {topic} in depth. We'll go from the basics all the way to advanced concepts, and by the end you'll have a solid understanding of {topic} and how it applies in the real world. So let's get started!"
        ),
        image_query: format!("{} educational overview", topic),
        layout: SlideLayout::Title,
        background_style: DEFAULT_BACKGROUND.to_string(),
    });

    for (idx, template) in SLIDE_TEMPLATES
        .iter()
        .cycle()
        .take(num_slides - 2)
        .enumerate()
    {
        slides.push(Slide {
            slide_number: idx + 2,
            title: fill(template.title),
            bullet_points: template.bullets.iter().map(|&b| fill(b)).collect(),
            speaker_notes: fill(template.notes),
            image_query: format!("{} {}", topic, template.image_suffix),
            layout: template.layout,
            background_style: DEFAULT_BACKGROUND.to_string(),
        });
    }

    slides.push(Slide {
        slide_number: num_slides,
        title: "Summary & Key Takeaways".to_string(),
        bullet_points: vec![
            format!("We explored the core fundamentals of {}", topic),
            "Examined real-world examples and applications".to_string(),
            "Discussed challenges, best practices, and future trends".to_string(),
            "Keep learning: practice and curiosity are your best tools".to_string(),
        ],
        speaker_notes: format!(
            "Alright, let's wrap up everything we've covered about {topic}. We started with the fundamentals, explored how it all works, looked at real-world examples, and discussed both the benefits and challenges. Mastering {topic} is a journey, so keep practicing and stay curious. Thank you!"
        ),
        image_query: format!("{} summary conclusion", topic),
        layout: SlideLayout::Summary,
        background_style: DEFAULT_BACKGROUND.to_string(),
    });

    SlideDeck {
        title: deck_title,
        subtitle: "A comprehensive educational overview".to_string(),
        total_slides: slides.len(),
        estimated_duration_minutes: slides.len() as u32 * MINUTES_PER_SLIDE,
        slides,
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
