use crate::attachment_analyzer::{AttachmentAnalyzer, AttachmentFinding};
use crate::config::Config;
use crate::content_analyzer::ContentAnalyzer;
use crate::explainer::Explanation;
use crate::header_analyzer::{AuthResults, HeaderAnalyzer};
use crate::message::{ParseError, ParsedMail};
use crate::result_log::ResultLog;
use crate::scoring::{Category, Finding, RiskLevel, ScoreBreakdown};
use crate::url_analyzer::{UrlAnalyzer, UrlFinding};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete record for one analyzed message. Assembled once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file: String,
    pub timestamp: DateTime<Utc>,
    pub score: u32,
    pub level: RiskLevel,
    pub threat_label: String,
    pub from: String,
    pub return_path: String,
    pub subject: String,
    pub auth: AuthResults,
    pub urls: Vec<UrlFinding>,
    pub attachments: Vec<AttachmentFinding>,
    pub indicators: Vec<Finding>,
    pub breakdown: ScoreBreakdown,
    pub explanation: Explanation,
}

pub struct EmailAnalyzer {
    content: ContentAnalyzer,
    urls: UrlAnalyzer,
    attachments: AttachmentAnalyzer,
    log_sink: Option<ResultLog>,
}

impl EmailAnalyzer {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(EmailAnalyzer {
            content: ContentAnalyzer::new(&config.phishing_phrases),
            urls: UrlAnalyzer::new(&config.url_shorteners)?,
            attachments: AttachmentAnalyzer::new(&config.risky_extensions),
            log_sink: None,
        })
    }

    /// Attach a result log; every completed analysis is appended to it once.
    pub fn with_log(mut self, log_sink: ResultLog) -> Self {
        self.log_sink = Some(log_sink);
        self
    }

    pub fn analyze_file(&self, path: &Path) -> anyhow::Result<AnalysisResult> {
        let raw = std::fs::read(path)
            .with_context(|| format!("Failed to read email file: {}", path.display()))?;
        let result = self.analyze_bytes(&path.display().to_string(), &raw)?;
        Ok(result)
    }

    pub fn analyze_bytes(&self, source: &str, raw: &[u8]) -> Result<AnalysisResult, ParseError> {
        let mail = ParsedMail::parse(raw)?;
        Ok(self.analyze_mail(source, &mail))
    }

    /// Run the four extractors over one parsed snapshot, normalize, classify,
    /// explain, and assemble the record. The extractors are independent of
    /// each other; once parsing succeeded this always completes.
    pub fn analyze_mail(&self, source: &str, mail: &ParsedMail) -> AnalysisResult {
        let header = HeaderAnalyzer::analyze(mail);
        let body = mail.body_text();
        let content = self.content.analyze(&body);
        let url = self.urls.analyze(&body);
        let attachment = self.attachments.analyze(&mail.attachment_names());

        let breakdown = ScoreBreakdown::normalize(
            header.raw_score,
            content.raw_score,
            url.raw_score,
            attachment.raw_score,
        );
        let level = RiskLevel::from_score(breakdown.total);
        let explanation = Explanation::build(&breakdown, level);

        let mut indicators = header.findings;
        indicators.extend(content.findings);
        indicators.extend(url.findings.iter().filter(|f| f.risk > 0).map(|f| {
            Finding::new(
                Category::Url,
                f.risk,
                format!("{}: {}", f.url, f.explanation),
            )
        }));
        indicators.extend(attachment.findings.iter().filter(|f| f.risk > 0).map(|f| {
            Finding::new(
                Category::Attachment,
                f.risk,
                format!("{}: {}", f.filename, f.explanation),
            )
        }));

        let result = AnalysisResult {
            file: source.to_string(),
            timestamp: Utc::now(),
            score: breakdown.total,
            level,
            threat_label: level.threat_label().to_string(),
            from: mail.from_display(),
            return_path: mail.return_path_display(),
            subject: mail.subject_display(),
            auth: header.auth,
            urls: url.findings,
            attachments: attachment.findings,
            indicators,
            breakdown,
            explanation,
        };

        log::info!(
            "Analyzed {}: score {}/100, level {}",
            result.file,
            result.score,
            result.level
        );

        // Logging happens strictly after the record is assembled. A failed
        // append never invalidates the computed result.
        if let Some(sink) = &self.log_sink {
            if let Err(e) = sink.append(&result) {
                log::warn!("Failed to append analysis result to log: {e}");
            }
        }

        result
    }
}
