use crate::scoring::{Category, Finding};

/// Every distinct matched phrase contributes this much, regardless of how
/// many times it occurs in the body.
pub const PHRASE_WEIGHT: u32 = 5;

#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    phrases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ContentAnalysis {
    pub raw_score: u32,
    pub matched_phrases: Vec<String>,
    pub findings: Vec<Finding>,
}

impl ContentAnalyzer {
    pub fn new(phrases: &[String]) -> Self {
        ContentAnalyzer {
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive substring scan. Deterministic: the same text always
    /// yields the same score.
    pub fn analyze(&self, body: &str) -> ContentAnalysis {
        let text = body.to_lowercase();
        let mut raw_score = 0;
        let mut matched_phrases = Vec::new();
        let mut findings = Vec::new();

        for phrase in &self.phrases {
            if text.contains(phrase.as_str()) {
                raw_score += PHRASE_WEIGHT;
                matched_phrases.push(phrase.clone());
                findings.push(Finding::new(
                    Category::Content,
                    PHRASE_WEIGHT,
                    format!("Phishing phrase detected: \"{phrase}\""),
                ));
            }
        }

        ContentAnalysis {
            raw_score,
            matched_phrases,
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn analyzer() -> ContentAnalyzer {
        ContentAnalyzer::new(&Config::default().phishing_phrases)
    }

    #[test]
    fn test_single_phrase_scores_5() {
        let analysis = analyzer().analyze("Please verify your account today.");
        assert_eq!(analysis.raw_score, 5);
        assert_eq!(analysis.matched_phrases, vec!["verify your account"]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let analysis = analyzer().analyze("URGENT: VERIFY YOUR ACCOUNT NOW");
        assert_eq!(analysis.raw_score, 5);
    }

    #[test]
    fn test_distinct_phrases_accumulate() {
        let analysis = analyzer()
            .analyze("We noticed unusual activity. Your account suspended. Confirm immediately.");
        assert_eq!(analysis.raw_score, 15);
        assert_eq!(analysis.findings.len(), 3);
    }

    #[test]
    fn test_repeated_phrase_counts_once() {
        let analysis =
            analyzer().analyze("verify your account ... again, verify your account!");
        assert_eq!(analysis.raw_score, 5);
    }

    #[test]
    fn test_idempotent() {
        let body = "reset your password and verify your account";
        let first = analyzer().analyze(body);
        let second = analyzer().analyze(body);
        assert_eq!(first.raw_score, second.raw_score);
        assert_eq!(first.matched_phrases, second.matched_phrases);
    }

    #[test]
    fn test_clean_text_scores_zero() {
        let analysis = analyzer().analyze("Lunch at noon on Friday?");
        assert_eq!(analysis.raw_score, 0);
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_empty_body_scores_zero() {
        let analysis = analyzer().analyze("");
        assert_eq!(analysis.raw_score, 0);
    }
}
