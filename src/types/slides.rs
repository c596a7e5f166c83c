use serde::{Deserialize, Serialize};

/// 幻灯片版式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SlideLayout {
    Title,
    #[default]
    Default,
    ImageFocus,
    Comparison,
    Summary,
}

impl SlideLayout {
    /// 无法识别的版式按default处理
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "title" => SlideLayout::Title,
            "image-focus" | "image_focus" => SlideLayout::ImageFocus,
            "comparison" => SlideLayout::Comparison,
            "summary" => SlideLayout::Summary,
            _ => SlideLayout::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub slide_number: usize,
    pub title: String,
    pub bullet_points: Vec<String>,
    /// 讲解时的口述稿
    pub speaker_notes: String,
    /// 为该页配图时使用的搜索词
    pub image_query: String,
    pub layout: SlideLayout,
    pub background_style: String,
}

/// 一份完整的讲义幻灯片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDeck {
    pub title: String,
    pub subtitle: String,
    pub total_slides: usize,
    pub estimated_duration_minutes: u32,
    pub slides: Vec<Slide>,
}
