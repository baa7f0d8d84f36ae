use crate::analyzer::AnalysisResult;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const CSV_HEADER: &str =
    "timestamp,file,score,level,header_score,content_score,url_score,attachment_score,from,subject";

/// Durable sink for completed analysis results: a flat append-only CSV log
/// plus an embedded database table holding the full structured record.
/// Connections are opened per operation, so the log is safe to share across
/// worker threads.
#[derive(Debug, Clone)]
pub struct ResultLog {
    csv_path: PathBuf,
    db_path: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub total: u64,
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl ResultLog {
    pub fn open(csv_path: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = csv_path.into();
        let db_path = db_path.into();

        for path in [&csv_path, &db_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create log directory: {}", parent.display())
                    })?;
                }
            }
        }
        Self::init_database(&db_path)?;

        Ok(ResultLog { csv_path, db_path })
    }

    /// Append one completed result to both logs.
    pub fn append(&self, result: &AnalysisResult) -> Result<()> {
        self.append_csv(result)?;
        self.append_db(result)?;
        log::debug!("Logged analysis of {}", result.file);
        Ok(())
    }

    fn append_csv(&self, result: &AnalysisResult) -> Result<()> {
        let write_header = !self.csv_path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Failed to open CSV log: {}", self.csv_path.display()))?;

        if write_header {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{}",
            result.timestamp.to_rfc3339(),
            csv_field(&result.file),
            result.score,
            result.level,
            result.breakdown.header.capped,
            result.breakdown.content.capped,
            result.breakdown.url.capped,
            result.breakdown.attachment.capped,
            csv_field(&result.from),
            csv_field(&result.subject),
        )?;
        Ok(())
    }

    fn append_db(&self, result: &AnalysisResult) -> Result<()> {
        let conn = Self::init_database(&self.db_path)?;
        let record = serde_json::to_string(result)?;
        conn.execute(
            "INSERT INTO analyses (timestamp, file, score, level, sender, subject, record)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                result.timestamp.to_rfc3339(),
                result.file,
                result.score,
                result.level.to_string(),
                result.from,
                result.subject,
                record,
            ],
        )?;
        Ok(())
    }

    fn init_database(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open analysis database: {}", db_path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                file TEXT NOT NULL,
                score INTEGER NOT NULL,
                level TEXT NOT NULL,
                sender TEXT NOT NULL,
                subject TEXT NOT NULL,
                record TEXT NOT NULL
            )",
            [],
        )?;

        Ok(conn)
    }

    /// Most recent logged results, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<AnalysisResult>> {
        let conn = Self::init_database(&self.db_path)?;
        let mut stmt =
            conn.prepare("SELECT record FROM analyses ORDER BY id DESC LIMIT ?")?;
        let records = stmt
            .query_map(params![limit as i64], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            results.push(serde_json::from_str(&record)?);
        }
        Ok(results)
    }

    pub fn summary(&self) -> Result<LogSummary> {
        let conn = Self::init_database(&self.db_path)?;
        let mut summary = LogSummary::default();

        let mut stmt = conn.prepare("SELECT level, COUNT(*) FROM analyses GROUP BY level")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        for row in rows {
            let (level, count) = row?;
            summary.total += count;
            match level.as_str() {
                "LOW" => summary.low = count,
                "MEDIUM" => summary.medium = count,
                "HIGH" => summary.high = count,
                other => log::warn!("Unknown risk level in log: {other}"),
            }
        }
        Ok(summary)
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::EmailAnalyzer;
    use crate::config::Config;

    fn sample_result(source: &str, raw: &[u8]) -> AnalysisResult {
        EmailAnalyzer::new(&Config::default())
            .unwrap()
            .analyze_bytes(source, raw)
            .unwrap()
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::open(dir.path().join("logs.csv"), dir.path().join("log.db")).unwrap();
        let result = sample_result("a.eml", b"To: x@y.z\r\n\r\nhello\r\n");

        log.append(&result).unwrap();
        log.append(&result).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("logs.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].contains("a.eml"));
    }

    #[test]
    fn test_recent_returns_full_records_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::open(dir.path().join("logs.csv"), dir.path().join("log.db")).unwrap();

        log.append(&sample_result("first.eml", b"To: x@y.z\r\n\r\nhello\r\n"))
            .unwrap();
        log.append(&sample_result(
            "second.eml",
            b"To: x@y.z\r\n\r\nplease verify your account\r\n",
        ))
        .unwrap();

        let recent = log.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].file, "second.eml");
        assert_eq!(recent[1].file, "first.eml");
        assert_eq!(recent[0].explanation.per_category.len(), 4);
    }

    #[test]
    fn test_summary_tallies_levels() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::open(dir.path().join("logs.csv"), dir.path().join("log.db")).unwrap();

        log.append(&sample_result("a.eml", b"To: x@y.z\r\n\r\nhello\r\n"))
            .unwrap();
        log.append(&sample_result(
            "b.eml",
            b"To: x@y.z\r\n\r\nverify your account http://bit.ly/x\r\n",
        ))
        .unwrap();

        let summary = log.summary().unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.low + summary.medium + summary.high, 2);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
