pub mod content_extraction;
pub mod image_selector;
pub mod intent_classifier;
pub mod quality;
pub mod slide_generator;
pub mod teaching_synthesis;

pub use content_extraction::{ContentExtractor, ExtractedContent};
pub use image_selector::ImageSelector;
pub use intent_classifier::IntentClassifier;
pub use quality::{QualityAssessor, follow_up_suggestions};
pub use slide_generator::SlideGenerator;
pub use teaching_synthesis::{LessonMaterials, TeachingSynthesizer};
