pub mod intent;
pub mod search;
pub mod slides;
pub mod teaching;

pub use intent::{DifficultyLevel, IntentAnalysis, QuestionType};
pub use search::{SearchComplexity, SearchDepth, SearchPlan, SearchResult, SearchTopic};
pub use slides::{Slide, SlideDeck, SlideLayout};
pub use teaching::{
    ImageData, ResearchRequest, Source, SourceType, TeachingResponse, TeachingSection,
};
