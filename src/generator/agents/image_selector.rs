//! 配图挑选 - 基于URL启发式为候选图片打分，不调用视觉模型

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::types::ImageData;

/// 最多考察的候选图片数
const MAX_CANDIDATES: usize = 6;
/// 同一站点最多入选的图片数
const MAX_PER_HOST: usize = 2;
/// 明显不是正文内容的图片
const JUNK_MARKERS: [&str; 8] = [
    "logo", "icon", "avatar", "sprite", "favicon", "pixel", "tracking", "badge",
];

pub struct ImageSelector {
    max_images: usize,
}

impl Default for ImageSelector {
    fn default() -> Self {
        Self { max_images: 2 }
    }
}

impl ImageSelector {
    pub fn new(max_images: usize) -> Self {
        Self { max_images }
    }

    /// 去重、过滤并按与概念的相关度排序，返回最好的若干张
    pub fn select(&self, image_urls: &[String], topic: &str, concepts: &[String]) -> Vec<ImageData> {
        if image_urls.is_empty() || self.max_images == 0 {
            return vec![];
        }

        let process_count = image_urls.len().min(MAX_CANDIDATES);
        let mut seen_files = HashSet::new();
        let mut per_host: HashMap<String, usize> = HashMap::new();
        let mut candidates = vec![];

        for url in image_urls.iter().take(process_count * 2) {
            if is_junk(url) {
                tracing::debug!("跳过非内容图片: {}", url);
                continue;
            }
            let file_name = file_name(url);
            let host = host(url);
            let host_count = per_host.get(&host).copied().unwrap_or(0);
            if host_count >= MAX_PER_HOST || !seen_files.insert(file_name) {
                continue;
            }
            per_host.insert(host, host_count + 1);
            candidates.push(url.clone());
            if candidates.len() >= process_count {
                break;
            }
        }

        let terms = concept_terms(topic, concepts);
        let mut scored: Vec<ImageData> = candidates
            .into_iter()
            .map(|url| {
                let lowered = url.to_lowercase();
                let matched: Vec<&String> = terms
                    .iter()
                    .filter(|term| lowered.contains(term.as_str()))
                    .collect();
                let overlap = if terms.is_empty() {
                    0.0
                } else {
                    matched.len() as f64 / terms.len() as f64
                };
                ImageData {
                    caption: caption(topic, concepts, &matched),
                    alt_text: Some(format!("Illustration for {}", short_topic(topic))),
                    relevance_score: 0.5 + 0.5 * overlap,
                    source_url: None,
                    url,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        scored.truncate(self.max_images);

        for (idx, image) in scored.iter().enumerate() {
            tracing::info!(
                "🖼️ 配图#{}: 得分{:.2} - {}",
                idx + 1,
                image.relevance_score,
                image.url.chars().take(80).collect::<String>()
            );
        }
        scored
    }
}

fn is_junk(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());
    JUNK_MARKERS.iter().any(|marker| path.contains(marker))
}

fn file_name(url: &str) -> String {
    url.split('?')
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_lowercase()
}

fn host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// 概念拆成小写词，没有概念时退回到问题里的词
fn concept_terms(topic: &str, concepts: &[String]) -> Vec<String> {
    let source = if concepts.is_empty() {
        vec![topic.to_string()]
    } else {
        concepts.to_vec()
    };
    let mut seen = HashSet::new();
    source
        .iter()
        .flat_map(|s| {
            s.split(|c: char| !c.is_alphanumeric())
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .filter(|term| term.chars().count() >= 4)
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

fn caption(topic: &str, concepts: &[String], matched: &[&String]) -> String {
    if !matched.is_empty() {
        let terms: Vec<&str> = matched.iter().map(|t| t.as_str()).collect();
        return format!("Visual illustrating {}", terms.join(", "));
    }
    match concepts.first() {
        Some(concept) => format!("Visual related to {}", concept),
        None => format!("Visual related to {}", short_topic(topic)),
    }
}

fn short_topic(topic: &str) -> String {
    let first_line = topic.trim().lines().next().unwrap_or_default();
    first_line.chars().take(80).collect()
}
