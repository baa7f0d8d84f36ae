use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Phrases scanned for in the decoded message body (case-insensitive).
    pub phishing_phrases: Vec<String>,
    /// Shortener hosts flagged during URL analysis (exact host match).
    pub url_shorteners: Vec<String>,
    /// File extensions flagged during attachment analysis (leading dot).
    pub risky_extensions: Vec<String>,
    /// Flat append-only log, one row per analyzed message.
    pub csv_log_path: String,
    /// Embedded database holding the full structured analysis records.
    pub database_path: String,
    /// Directory report artifacts are exported into.
    pub report_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            phishing_phrases: vec![
                "verify your account".to_string(),
                "reset your password".to_string(),
                "unusual activity".to_string(),
                "confirm immediately".to_string(),
                "account suspended".to_string(),
            ],
            url_shorteners: vec![
                "bit.ly".to_string(),
                "t.co".to_string(),
                "tinyurl.com".to_string(),
            ],
            risky_extensions: vec![
                ".exe".to_string(),
                ".js".to_string(),
                ".vbs".to_string(),
                ".zip".to_string(),
                ".html".to_string(),
            ],
            csv_log_path: "logs.csv".to_string(),
            database_path: "mailscore.db".to_string(),
            report_dir: "reports".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
