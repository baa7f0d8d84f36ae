use crate::analyzer::AnalysisResult;
use crate::result_log::csv_field;
use crate::scoring::RiskLevel;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const FORMATS: [&str; 4] = ["text", "html", "csv", "json"];

pub fn generate_report(result: &AnalysisResult, format: &str) -> Result<String> {
    match format {
        "text" => Ok(render_document(result)),
        "html" => Ok(render_html(result)),
        "csv" => Ok(render_csv(result)),
        "json" => Ok(serde_json::to_string_pretty(result)?),
        _ => anyhow::bail!("Unsupported report format: {format}"),
    }
}

/// Render and write one artifact into the output directory, named after the
/// analyzed file and its analysis timestamp.
pub fn export_report(result: &AnalysisResult, format: &str, output_dir: &Path) -> Result<PathBuf> {
    let rendered = generate_report(result, format)?;
    std::fs::create_dir_all(output_dir)?;

    let stem = Path::new(&result.file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("analysis");
    let extension = match format {
        "text" => "txt",
        other => other,
    };
    let path = output_dir.join(format!(
        "{}_{}.{}",
        stem,
        result.timestamp.format("%Y%m%d_%H%M%S"),
        extension
    ));
    std::fs::write(&path, rendered)?;
    Ok(path)
}

pub fn render_document(result: &AnalysisResult) -> String {
    let mut doc = String::new();
    doc.push_str("EMAIL SECURITY ANALYSIS REPORT\n");
    doc.push_str("==============================\n\n");
    doc.push_str(&format!("File Analyzed : {}\n", result.file));
    doc.push_str(&format!("Sender        : {}\n", result.from));
    doc.push_str(&format!("Return-Path   : {}\n", result.return_path));
    doc.push_str(&format!("Subject       : {}\n", result.subject));
    doc.push_str(&format!(
        "Analysis Time : {}\n\n",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    doc.push_str(&format!("RISK LEVEL    : {}\n", result.level));
    doc.push_str(&format!("SCORE         : {}/100\n", result.score));
    doc.push_str(&format!("THREAT        : {}\n\n", result.threat_label));
    doc.push_str(&format!("SUMMARY:\n{}\n\n", result.level.summary()));

    doc.push_str(&result.explanation.render_text());

    doc.push('\n');
    if result.urls.is_empty() {
        doc.push_str("Links: No suspicious links detected.\n");
    } else {
        doc.push_str("Links:\n");
        for url in &result.urls {
            doc.push_str(&format!(
                "- {}: Risk={}, Explanation={}\n",
                url.url, url.risk, url.explanation
            ));
        }
    }

    doc.push('\n');
    if result.attachments.is_empty() {
        doc.push_str("Attachments: No attachments found.\n");
    } else {
        doc.push_str("Attachments:\n");
        for attachment in &result.attachments {
            doc.push_str(&format!(
                "- {}: Risk={}, Explanation={}\n",
                attachment.filename, attachment.risk, attachment.explanation
            ));
        }
    }

    doc.push_str("\nRecommended Action\n");
    doc.push_str("------------------\n");
    doc.push_str(result.level.recommended_actions());
    doc.push('\n');
    doc
}

/// Flat key/value export of the top-level fields and the score breakdown.
pub fn render_csv(result: &AnalysisResult) -> String {
    let mut csv = String::new();
    csv.push_str("Field,Value\n");
    csv.push_str(&format!("File,{}\n", csv_field(&result.file)));
    csv.push_str(&format!("Sender,{}\n", csv_field(&result.from)));
    csv.push_str(&format!("Subject,{}\n", csv_field(&result.subject)));
    csv.push_str(&format!("Timestamp,{}\n", result.timestamp.to_rfc3339()));
    csv.push_str(&format!("Risk Level,{}\n", result.level));
    csv.push_str(&format!("Score,{}\n", result.score));
    csv.push('\n');
    csv.push_str("Score Breakdown\n");
    for sub in result.breakdown.sub_scores() {
        csv.push_str(&format!(
            "{},{}\n",
            sub.category.analysis_label(),
            sub.capped
        ));
    }
    csv
}

fn render_html(result: &AnalysisResult) -> String {
    let level_class = match result.level {
        RiskLevel::Low => "safe",
        RiskLevel::Medium | RiskLevel::High => "threat",
    };

    let mut breakdown_rows = String::new();
    for entry in &result.explanation.per_category {
        breakdown_rows.push_str(&format!(
            "        <p>{}: {}/{} &mdash; {}</p>\n",
            html_escape(&entry.title),
            entry.score,
            entry.ceiling,
            html_escape(&entry.summary)
        ));
    }

    let mut listings = String::new();
    if result.urls.is_empty() {
        listings.push_str("        <p>No suspicious links detected.</p>\n");
    } else {
        for url in &result.urls {
            listings.push_str(&format!(
                "        <p>{} &mdash; Risk {} ({})</p>\n",
                html_escape(&url.url),
                url.risk,
                html_escape(&url.explanation)
            ));
        }
    }
    if result.attachments.is_empty() {
        listings.push_str("        <p>No attachments found.</p>\n");
    } else {
        for attachment in &result.attachments {
            listings.push_str(&format!(
                "        <p>{} &mdash; Risk {} ({})</p>\n",
                html_escape(&attachment.filename),
                attachment.risk,
                html_escape(&attachment.explanation)
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Email Security Analysis Report</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .metric {{ background: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 5px; }}
        .threat {{ color: #d32f2f; }}
        .safe {{ color: #388e3c; }}
    </style>
</head>
<body>
    <h1>Email Security Analysis Report</h1>
    <div class="metric">
        <h3>Overview</h3>
        <p>File: {file}</p>
        <p>Sender: {from}</p>
        <p>Subject: {subject}</p>
        <p class="{level_class}">Risk Level: {level} ({threat})</p>
        <p class="{level_class}">Score: {score}/100</p>
        <p>{summary}</p>
    </div>
    <div class="metric">
        <h3>Score Breakdown</h3>
{breakdown_rows}    </div>
    <div class="metric">
        <h3>Links and Attachments</h3>
{listings}    </div>
    <div class="metric">
        <h3>Recommended Action</h3>
        <pre>{actions}</pre>
    </div>
</body>
</html>
"#,
        file = html_escape(&result.file),
        from = html_escape(&result.from),
        subject = html_escape(&result.subject),
        level_class = level_class,
        level = result.level,
        threat = html_escape(&result.threat_label),
        score = result.score,
        summary = html_escape(result.level.summary()),
        breakdown_rows = breakdown_rows,
        listings = listings,
        actions = html_escape(result.level.recommended_actions()),
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
