use serde::{Deserialize, Serialize};
use std::fmt;

/// Grand total never exceeds this, regardless of how many categories max out.
pub const TOTAL_CEILING: u32 = 100;

/// Classification thresholds: below MEDIUM_THRESHOLD is LOW, below
/// HIGH_THRESHOLD is MEDIUM, everything else is HIGH.
pub const MEDIUM_THRESHOLD: u32 = 30;
pub const HIGH_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Header,
    Content,
    Url,
    Attachment,
}

impl Category {
    /// Maximum capped contribution of this category to the total score.
    pub fn ceiling(&self) -> u32 {
        match self {
            Category::Header => 25,
            Category::Content => 30,
            Category::Url => 30,
            Category::Attachment => 15,
        }
    }

    /// Short label used in score breakdown lines.
    pub fn analysis_label(&self) -> &'static str {
        match self {
            Category::Header => "Header Analysis",
            Category::Content => "Content Analysis",
            Category::Url => "URL Analysis",
            Category::Attachment => "Attachment Analysis",
        }
    }

    /// Reader-facing section title used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Header => "Sender Authentication",
            Category::Content => "Email Content",
            Category::Url => "Links",
            Category::Attachment => "Attachments",
        }
    }
}

/// A single human-readable risk observation tied to one signal instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub weight: u32,
    pub description: String,
}

impl Finding {
    pub fn new(category: Category, weight: u32, description: impl Into<String>) -> Self {
        Finding {
            category,
            weight,
            description: description.into(),
        }
    }
}

/// A category's raw contribution and its value after capping to the ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubScore {
    pub category: Category,
    pub raw: u32,
    pub capped: u32,
}

impl SubScore {
    pub fn new(category: Category, raw: u32) -> Self {
        SubScore {
            category,
            raw,
            capped: raw.min(category.ceiling()),
        }
    }
}

/// The four capped sub-scores plus the capped grand total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub header: SubScore,
    pub content: SubScore,
    pub url: SubScore,
    pub attachment: SubScore,
    pub total: u32,
}

impl ScoreBreakdown {
    /// Cap each raw sub-score to its category ceiling, sum the capped values,
    /// and cap the sum. Pure and order-independent.
    pub fn normalize(header_raw: u32, content_raw: u32, url_raw: u32, attachment_raw: u32) -> Self {
        let header = SubScore::new(Category::Header, header_raw);
        let content = SubScore::new(Category::Content, content_raw);
        let url = SubScore::new(Category::Url, url_raw);
        let attachment = SubScore::new(Category::Attachment, attachment_raw);
        let total = (header.capped + content.capped + url.capped + attachment.capped)
            .min(TOTAL_CEILING);

        ScoreBreakdown {
            header,
            content,
            url,
            attachment,
            total,
        }
    }

    pub fn sub_scores(&self) -> [SubScore; 4] {
        [self.header, self.content, self.url, self.attachment]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Pure step function of the normalized total score.
    pub fn from_score(score: u32) -> Self {
        if score < MEDIUM_THRESHOLD {
            RiskLevel::Low
        } else if score < HIGH_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn threat_label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "No confirmed threat detected",
            RiskLevel::Medium => "Potentially suspicious email",
            RiskLevel::High => "Confirmed phishing threat",
        }
    }

    /// Plain-language summary sentence for non-technical readers.
    pub fn summary(&self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "This email appears safe. No phishing or malicious indicators were detected."
            }
            RiskLevel::Medium => {
                "This email shows some suspicious characteristics. Exercise caution and avoid clicking unknown links."
            }
            RiskLevel::High => {
                "This email is likely malicious. Do NOT click links or open attachments."
            }
        }
    }

    pub fn recommended_actions(&self) -> &'static str {
        match self {
            RiskLevel::Low => "- No action required.",
            RiskLevel::Medium => "- Avoid clicking unknown links\n- Verify the sender if unsure",
            RiskLevel::High => {
                "- Do NOT click links\n- Do NOT open attachments\n- Report to your security team"
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}
