pub mod client;

pub use client::{ChatModel, LLMClient};
