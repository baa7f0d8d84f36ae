pub mod analyzer;
pub mod attachment_analyzer;
pub mod config;
pub mod content_analyzer;
pub mod explainer;
pub mod header_analyzer;
pub mod message;
pub mod report;
pub mod result_log;
pub mod scoring;
pub mod url_analyzer;

pub use analyzer::{AnalysisResult, EmailAnalyzer};
pub use config::Config;
pub use explainer::Explanation;
pub use message::{ParseError, ParsedMail};
pub use result_log::ResultLog;
pub use scoring::{Category, Finding, RiskLevel, ScoreBreakdown, SubScore};
