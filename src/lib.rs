pub mod cache;
pub mod cli;
pub mod config;
pub mod cost;
pub mod generator;
pub mod llm;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use generator::workflow::{TeachingOrchestrator, launch};
pub use types::{ResearchRequest, TeachingResponse};
