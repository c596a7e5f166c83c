//! 输出 - 把教学响应渲染为Markdown并连同JSON（以及可选的幻灯片）一起落盘

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::types::TeachingResponse;

/// slug的最大长度
const MAX_SLUG_CHARS: usize = 60;

/// 保存教学响应，返回Markdown文件路径
pub async fn save(output_dir: &Path, response: &TeachingResponse) -> Result<PathBuf> {
    let outlet = DiskOutlet::new(output_dir);
    outlet.save(response).await
}

pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub async fn save(&self, response: &TeachingResponse) -> Result<PathBuf> {
        tracing::info!("🖊️ 教学内容存储中...");
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.output_dir.display()))?;

        let slug = slugify(&response.question);
        let markdown_path = self.output_dir.join(format!("{}.md", slug));
        let json_path = self.output_dir.join(format!("{}.json", slug));

        fs::write(&markdown_path, render_markdown(response))
            .await
            .with_context(|| format!("Failed to write: {}", markdown_path.display()))?;
        fs::write(&json_path, serde_json::to_string_pretty(response)?)
            .await
            .with_context(|| format!("Failed to write: {}", json_path.display()))?;

        if let Some(deck) = &response.slides {
            let slides_path = self.output_dir.join(format!("{}.slides.json", slug));
            fs::write(&slides_path, serde_json::to_string_pretty(deck)?)
                .await
                .with_context(|| format!("Failed to write: {}", slides_path.display()))?;
            tracing::info!("🎞️ 幻灯片已保存: {}", slides_path.display());
        }

        tracing::info!("💾 已保存: {}", markdown_path.display());
        Ok(markdown_path)
    }
}

/// 问题转为文件名：小写字母数字，其余字符折叠为单个连字符
pub fn slugify(question: &str) -> String {
    let mut slug = String::new();
    for c in question.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        if slug.chars().count() >= MAX_SLUG_CHARS {
            break;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "lesson".to_string()
    } else {
        slug.to_string()
    }
}

pub fn render_markdown(response: &TeachingResponse) -> String {
    let mut doc = format!("# {}\n\n", response.question.trim());
    doc.push_str(&format!(
        "> difficulty: {} · confidence: {:.2} · {:.1}s\n\n",
        response.difficulty_level, response.confidence_score, response.processing_time
    ));

    doc.push_str(&format!("## TL;DR\n\n{}\n\n", response.tldr));
    doc.push_str(&format!(
        "## {}\n\n{}\n\n",
        response.explanation.title, response.explanation.content
    ));

    if response.visual_explanation.is_some() || !response.images.is_empty() {
        doc.push_str("## Visual Explanation\n\n");
        for image in &response.images {
            doc.push_str(&format!(
                "![{}]({})\n*{}*\n\n",
                image.alt_text.as_deref().unwrap_or(&image.caption),
                image.url,
                image.caption
            ));
        }
        if let Some(visual) = &response.visual_explanation {
            doc.push_str(&format!("{}\n\n", visual));
        }
    }

    if !response.analogy.is_empty() {
        doc.push_str(&format!("## Real-World Analogy\n\n{}\n\n", response.analogy));
    }

    if !response.practice_questions.is_empty() {
        doc.push_str("## Practice Questions\n\n");
        for (idx, q) in response.practice_questions.iter().enumerate() {
            doc.push_str(&format!("{}. {}\n", idx + 1, q));
        }
        doc.push('\n');
    }

    if !response.sources.is_empty() {
        doc.push_str("## Sources\n\n");
        for (idx, source) in response.sources.iter().enumerate() {
            doc.push_str(&format!(
                "[{}] [{}]({}) - {}\n",
                idx + 1,
                source.title,
                source.url,
                source.domain
            ));
        }
        doc.push('\n');
    }

    if let Some(deck) = &response.slides {
        doc.push_str(&format!(
            "## Slide Outline\n\n*{}* ({} slides, ~{} min)\n\n",
            deck.title, deck.total_slides, deck.estimated_duration_minutes
        ));
        for slide in &deck.slides {
            doc.push_str(&format!("{}. {}\n", slide.slide_number, slide.title));
        }
        doc.push('\n');
    }

    if !response.follow_up_suggestions.is_empty() {
        doc.push_str("## Keep Exploring\n\n");
        for suggestion in &response.follow_up_suggestions {
            doc.push_str(&format!("- {}\n", suggestion));
        }
        doc.push('\n');
    }

    if let Some(cost) = &response.cost {
        doc.push_str(&format!(
            "---\n*search credits: {} (${:.3}) · cached queries: {} · llm calls: {}*\n",
            cost.credits, cost.usd, cost.cached_queries, cost.llm_calls
        ));
    }

    doc
}
