use serde::{Deserialize, Serialize};

pub const RISKY_EXTENSION_WEIGHT: u32 = 30;
pub const DOUBLE_EXTENSION_WEIGHT: u32 = 10;

#[derive(Debug, Clone)]
pub struct AttachmentAnalyzer {
    risky_extensions: Vec<String>,
}

/// Per-attachment risk observation carried on the final analysis record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentFinding {
    pub filename: String,
    pub risk: u32,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct AttachmentAnalysis {
    pub raw_score: u32,
    pub findings: Vec<AttachmentFinding>,
}

impl AttachmentAnalyzer {
    pub fn new(risky_extensions: &[String]) -> Self {
        AttachmentAnalyzer {
            risky_extensions: risky_extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Zero attachments yield an empty finding list, never an error.
    pub fn analyze(&self, filenames: &[String]) -> AttachmentAnalysis {
        let findings: Vec<AttachmentFinding> = filenames
            .iter()
            .map(|name| self.analyze_filename(name))
            .collect();
        let raw_score = findings.iter().map(|f| f.risk).sum();

        AttachmentAnalysis {
            raw_score,
            findings,
        }
    }

    pub fn analyze_filename(&self, filename: &str) -> AttachmentFinding {
        let (ext, stem) = split_extension(filename);
        let risky = self.risky_extensions.contains(&ext);
        let double = stem.contains('.');

        let mut risk = 0;
        if risky {
            risk += RISKY_EXTENSION_WEIGHT;
        }
        if double {
            risk += DOUBLE_EXTENSION_WEIGHT;
        }

        let explanation = match (risky, double) {
            (true, true) => format!("High-risk extension: {ext} + double extension"),
            (true, false) => format!("High-risk extension: {ext}"),
            (false, true) => "Double extension".to_string(),
            (false, false) => "Attachment OK".to_string(),
        };

        AttachmentFinding {
            filename: filename.to_string(),
            risk,
            explanation,
        }
    }
}

/// Extension is everything from the last dot, lower-cased; the stem is what
/// precedes it. A dotless filename yields the whole lowercased name as its
/// extension and an empty stem.
fn split_extension(filename: &str) -> (String, &str) {
    match filename.rfind('.') {
        Some(idx) => (filename[idx..].to_lowercase(), &filename[..idx]),
        None => (format!(".{}", filename.to_lowercase()), ""),
    }
}
