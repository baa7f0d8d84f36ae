use crate::message::ParsedMail;
use crate::scoring::{Category, Finding};
use serde::{Deserialize, Serialize};

pub const SPF_FAIL_WEIGHT: u32 = 8;
pub const DKIM_FAIL_WEIGHT: u32 = 8;
pub const DMARC_FAIL_WEIGHT: u32 = 6;
pub const EXCESSIVE_HOPS_WEIGHT: u32 = 3;

/// Relay chains longer than this are penalized.
pub const MAX_EXPECTED_HOPS: usize = 6;

/// Presence-only authentication verdict. A marker header that exists counts
/// as a pass; validity of its value is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResults {
    pub spf: AuthState,
    pub dkim: AuthState,
    pub dmarc: AuthState,
    pub received_hops: usize,
}

#[derive(Debug, Clone)]
pub struct HeaderAnalysis {
    pub auth: AuthResults,
    pub raw_score: u32,
    pub findings: Vec<Finding>,
}

pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    pub fn analyze(mail: &ParsedMail) -> HeaderAnalysis {
        let auth = AuthResults {
            spf: marker(mail.has_header("received-spf") || mail.has_header("spf")),
            dkim: marker(mail.has_header("dkim-signature")),
            dmarc: marker(mail.has_header("dmarc")),
            received_hops: mail.received_hops(),
        };
        Self::score(auth)
    }

    /// Additive scoring over already-extracted header facts. Absent markers
    /// count as failures.
    pub fn score(auth: AuthResults) -> HeaderAnalysis {
        let mut raw_score = 0;
        let mut findings = Vec::new();

        if auth.spf == AuthState::Fail {
            raw_score += SPF_FAIL_WEIGHT;
            findings.push(Finding::new(
                Category::Header,
                SPF_FAIL_WEIGHT,
                "SPF marker missing or failing",
            ));
        }
        if auth.dkim == AuthState::Fail {
            raw_score += DKIM_FAIL_WEIGHT;
            findings.push(Finding::new(
                Category::Header,
                DKIM_FAIL_WEIGHT,
                "DKIM signature missing or failing",
            ));
        }
        if auth.dmarc == AuthState::Fail {
            raw_score += DMARC_FAIL_WEIGHT;
            findings.push(Finding::new(
                Category::Header,
                DMARC_FAIL_WEIGHT,
                "DMARC marker missing or failing",
            ));
        }
        if auth.received_hops > MAX_EXPECTED_HOPS {
            raw_score += EXCESSIVE_HOPS_WEIGHT;
            findings.push(Finding::new(
                Category::Header,
                EXCESSIVE_HOPS_WEIGHT,
                format!("Unusually long relay chain ({} hops)", auth.received_hops),
            ));
        }

        HeaderAnalysis {
            auth,
            raw_score,
            findings,
        }
    }
}

fn marker(present: bool) -> AuthState {
    if present {
        AuthState::Pass
    } else {
        AuthState::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(spf: AuthState, dkim: AuthState, dmarc: AuthState, hops: usize) -> AuthResults {
        AuthResults {
            spf,
            dkim,
            dmarc,
            received_hops: hops,
        }
    }

    #[test]
    fn test_all_markers_absent_scores_22() {
        let analysis = HeaderAnalyzer::score(facts(
            AuthState::Fail,
            AuthState::Fail,
            AuthState::Fail,
            0,
        ));
        assert_eq!(analysis.raw_score, 22);
        assert_eq!(analysis.findings.len(), 3);
    }

    #[test]
    fn test_excessive_hops_add_3() {
        let analysis = HeaderAnalyzer::score(facts(
            AuthState::Fail,
            AuthState::Fail,
            AuthState::Fail,
            8,
        ));
        assert_eq!(analysis.raw_score, 25);
    }

    #[test]
    fn test_hop_boundary_is_exclusive() {
        let at_limit =
            HeaderAnalyzer::score(facts(AuthState::Pass, AuthState::Pass, AuthState::Pass, 6));
        assert_eq!(at_limit.raw_score, 0);

        let over_limit =
            HeaderAnalyzer::score(facts(AuthState::Pass, AuthState::Pass, AuthState::Pass, 7));
        assert_eq!(over_limit.raw_score, 3);
    }

    #[test]
    fn test_all_markers_present_scores_zero() {
        let analysis = HeaderAnalyzer::score(facts(
            AuthState::Pass,
            AuthState::Pass,
            AuthState::Pass,
            2,
        ));
        assert_eq!(analysis.raw_score, 0);
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_analyze_treats_missing_headers_as_failing() {
        let mail = crate::message::ParsedMail::parse(b"To: x@y.z\r\n\r\nhello\r\n").unwrap();
        let analysis = HeaderAnalyzer::analyze(&mail);
        assert_eq!(analysis.auth.spf, AuthState::Fail);
        assert_eq!(analysis.auth.dkim, AuthState::Fail);
        assert_eq!(analysis.auth.dmarc, AuthState::Fail);
        assert_eq!(analysis.raw_score, 22);
    }

    #[test]
    fn test_analyze_detects_present_markers() {
        let raw = b"Received-SPF: pass (example.com: domain designates sender)\r\n\
DKIM-Signature: v=1; a=rsa-sha256; d=example.com; s=sel;\r\n\
From: a@example.com\r\n\
\r\n\
body\r\n";
        let mail = crate::message::ParsedMail::parse(raw).unwrap();
        let analysis = HeaderAnalyzer::analyze(&mail);
        assert_eq!(analysis.auth.spf, AuthState::Pass);
        assert_eq!(analysis.auth.dkim, AuthState::Pass);
        // No DMARC header, so only the DMARC penalty remains.
        assert_eq!(analysis.raw_score, DMARC_FAIL_WEIGHT);
    }
}
