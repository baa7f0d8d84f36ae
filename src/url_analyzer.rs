use regex::Regex;
use serde::{Deserialize, Serialize};

pub const SHORTENER_WEIGHT: u32 = 15;
pub const NUMERIC_HOST_WEIGHT: u32 = 20;

#[derive(Debug, Clone)]
pub struct UrlAnalyzer {
    shorteners: Vec<String>,
    url_pattern: Regex,
}

/// Per-URL risk observation carried on the final analysis record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFinding {
    pub url: String,
    pub risk: u32,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct UrlAnalysis {
    pub raw_score: u32,
    pub findings: Vec<UrlFinding>,
}

impl UrlAnalyzer {
    pub fn new(shorteners: &[String]) -> anyhow::Result<Self> {
        Ok(UrlAnalyzer {
            shorteners: shorteners.iter().map(|s| s.to_lowercase()).collect(),
            url_pattern: Regex::new(r"https?://[^\s]+")?,
        })
    }

    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        self.url_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn analyze(&self, body: &str) -> UrlAnalysis {
        let findings: Vec<UrlFinding> = self
            .extract_urls(body)
            .iter()
            .map(|url| self.analyze_url(url))
            .collect();
        let raw_score = findings.iter().map(|f| f.risk).sum();

        UrlAnalysis {
            raw_score,
            findings,
        }
    }

    pub fn analyze_url(&self, url: &str) -> UrlFinding {
        let host = host_portion(url).to_lowercase();
        let mut risk = 0;
        let mut explanation = String::new();

        if self.shorteners.iter().any(|s| *s == host) {
            risk += SHORTENER_WEIGHT;
            explanation = "URL shortener detected".to_string();
        }
        if host.replace('.', "").chars().any(|c| c.is_ascii_digit()) {
            risk += NUMERIC_HOST_WEIGHT;
            explanation = "IP-based URL detected".to_string();
        }
        if explanation.is_empty() {
            explanation = "URL checked, no high-risk patterns detected".to_string();
        }

        log::debug!("url {url}: host={host} risk={risk}");

        UrlFinding {
            url: url.to_string(),
            risk,
            explanation,
        }
    }
}

/// Host heuristic: the text between the second and third slash. URLs with
/// fewer than two slashes fall back to the raw string, which can misclassify
/// such inputs. Known limitation, kept deliberately.
fn host_portion(url: &str) -> &str {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() > 2 {
        parts[2]
    } else {
        url
    }
}
