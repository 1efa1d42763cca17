//! Gemini-backed generation of company insights.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
mod types;

pub use client::GeminiClient;
pub use error::InsightError;
pub use parse::parse_insights;
pub use prompt::build_analysis_prompt;
