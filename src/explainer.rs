use crate::scoring::{Category, RiskLevel, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryExplanation {
    pub category: Category,
    pub title: String,
    pub score: u32,
    pub ceiling: u32,
    pub summary: String,
}

/// The single structured explanation type. Serializing it and rendering it
/// as text expose the same content; no consumer-specific variants exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub per_category: Vec<CategoryExplanation>,
    pub narrative: String,
}

impl Explanation {
    pub fn build(breakdown: &ScoreBreakdown, level: RiskLevel) -> Self {
        let per_category = breakdown
            .sub_scores()
            .iter()
            .map(|sub| {
                let summary = if sub.capped == 0 {
                    "No issues detected. This area appears safe.".to_string()
                } else {
                    format!(
                        "Some concerns identified. {}",
                        context_sentence(sub.category)
                    )
                };
                CategoryExplanation {
                    category: sub.category,
                    title: sub.category.title().to_string(),
                    score: sub.capped,
                    ceiling: sub.category.ceiling(),
                    summary,
                }
            })
            .collect();

        Explanation {
            per_category,
            narrative: level.summary().to_string(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::from("TOTAL SCORE BREAKDOWN:\n");
        for entry in &self.per_category {
            out.push_str(&format!(
                "- {:<20}: {}/{}\n",
                entry.category.analysis_label(),
                entry.score,
                entry.ceiling
            ));
        }
        out.push('\n');
        for entry in &self.per_category {
            out.push_str(&format!("{}: {}\n", entry.title, entry.summary));
        }
        out.push('\n');
        out.push_str(&self.narrative);
        out.push('\n');
        out
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_text())
    }
}

fn context_sentence(category: Category) -> &'static str {
    match category {
        Category::Header => "SPF, DKIM, and DMARC checks were evaluated.",
        Category::Content => "Checked for suspicious words or phishing patterns.",
        Category::Url => "Links in the email were evaluated for potential risks.",
        Category::Attachment => "Attachments were checked for risky file names.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_entry_per_category_with_ceilings() {
        let breakdown = ScoreBreakdown::normalize(22, 5, 15, 40);
        let explanation = Explanation::build(&breakdown, RiskLevel::Medium);

        assert_eq!(explanation.per_category.len(), 4);
        let ceilings: Vec<u32> = explanation
            .per_category
            .iter()
            .map(|e| e.ceiling)
            .collect();
        assert_eq!(ceilings, vec![25, 30, 30, 15]);
        // Attachment entry shows the capped value, not the raw 40.
        assert_eq!(explanation.per_category[3].score, 15);
    }

    #[test]
    fn test_zero_score_categories_read_as_safe() {
        let breakdown = ScoreBreakdown::normalize(0, 0, 0, 0);
        let explanation = Explanation::build(&breakdown, RiskLevel::Low);
        assert!(explanation
            .per_category
            .iter()
            .all(|e| e.summary.contains("appears safe")));
    }

    #[test]
    fn test_text_and_structured_forms_agree() {
        let breakdown = ScoreBreakdown::normalize(22, 5, 15, 40);
        let explanation = Explanation::build(&breakdown, RiskLevel::Medium);
        let text = explanation.render_text();

        assert!(text.contains("TOTAL SCORE BREAKDOWN:"));
        for entry in &explanation.per_category {
            assert!(text.contains(&format!("{}/{}", entry.score, entry.ceiling)));
            assert!(text.contains(&entry.summary));
        }
        assert!(text.contains(&explanation.narrative));
    }

    #[test]
    fn test_reproducible_for_equal_inputs() {
        let breakdown = ScoreBreakdown::normalize(8, 10, 0, 0);
        let a = Explanation::build(&breakdown, RiskLevel::Low);
        let b = Explanation::build(&breakdown, RiskLevel::Low);
        assert_eq!(a.render_text(), b.render_text());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
