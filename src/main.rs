use clap::{Arg, Command};
use log::LevelFilter;
use mailscore::analyzer::{AnalysisResult, EmailAnalyzer};
use mailscore::config::Config;
use mailscore::report;
use mailscore::result_log::ResultLog;
use std::path::Path;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("mailscore")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Conservative phishing risk scoring for email messages")
        .long_about(
            "mailscore combines four independent heuristic analyzers\n\
             (header authentication, body content, embedded URLs, attachments)\n\
             into a single bounded risk score with a reproducible explanation.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/mailscore.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FORMAT")
                .help("Export a report artifact per analyzed file (text, html, csv, json)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Report output directory (defaults to the configured reports directory)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print each analysis result as JSON instead of the overview")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .value_name("COUNT")
                .num_args(0..=1)
                .default_missing_value("10")
                .help("Show recent logged analyses and exit"),
        )
        .arg(
            Arg::new("no-log")
                .long("no-log")
                .help("Do not append results to the analysis logs")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("files")
                .value_name("EMAIL_FILE")
                .num_args(0..)
                .help("Email message files (.eml) to analyze"),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = load_config(config_path);

    if let Some(count) = matches.get_one::<String>("history") {
        let count: usize = count.parse().unwrap_or(10);
        show_history(&config, count);
        return;
    }

    let files: Vec<String> = matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    if files.is_empty() {
        eprintln!("No email files to analyze. Pass one or more .eml files.");
        process::exit(1);
    }

    let mut analyzer = match EmailAnalyzer::new(&config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error initializing analyzer: {e}");
            process::exit(1);
        }
    };
    if !matches.get_flag("no-log") {
        match ResultLog::open(&config.csv_log_path, &config.database_path) {
            Ok(log_sink) => analyzer = analyzer.with_log(log_sink),
            Err(e) => {
                eprintln!("Error opening analysis logs: {e}");
                process::exit(1);
            }
        }
    }
    let analyzer = Arc::new(analyzer);

    let report_format = matches.get_one::<String>("report").cloned();
    let output_dir = matches
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| config.report_dir.clone());
    let as_json = matches.get_flag("json");

    // One blocking task per file; results are collected in input order.
    let mut tasks = Vec::new();
    for file in files {
        let analyzer = analyzer.clone();
        let task_file = file.clone();
        tasks.push((
            file,
            tokio::task::spawn_blocking(move || analyzer.analyze_file(Path::new(&task_file))),
        ));
    }

    let mut failures = 0;
    for (file, task) in tasks {
        match task.await {
            Ok(Ok(result)) => {
                if as_json {
                    match serde_json::to_string_pretty(&result) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("❌ Failed to serialize result for {file}: {e}");
                            failures += 1;
                        }
                    }
                } else {
                    print_overview(&result);
                }
                if let Some(format) = &report_format {
                    match report::export_report(&result, format, Path::new(&output_dir)) {
                        Ok(path) => println!("📄 Report written: {}", path.display()),
                        Err(e) => {
                            eprintln!("❌ Report export failed for {file}: {e}");
                            failures += 1;
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                eprintln!("❌ Analysis failed for {file}: {e}");
                failures += 1;
            }
            Err(e) => {
                eprintln!("❌ Analysis task failed for {file}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        match Config::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e}");
                process::exit(1);
            }
        }
    } else {
        log::debug!("Configuration file {config_path} not found, using defaults");
        Config::default()
    }
}

fn generate_default_config(path: &str) {
    match Config::default().to_file(path) {
        Ok(()) => {
            println!("✅ Default configuration written to: {path}");
            println!("Edit the heuristic lists and log paths, then run:");
            println!("  mailscore -c {path} <message.eml>");
        }
        Err(e) => {
            eprintln!("Error generating configuration: {e}");
            process::exit(1);
        }
    }
}

fn print_overview(result: &AnalysisResult) {
    println!();
    println!("📊 Email Risk Analysis");
    println!("═══════════════════════════════════════");
    println!("  File      : {}", result.file);
    println!(
        "  Analyzed  : {}",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  From      : {}", result.from);
    println!("  Return-To : {}", result.return_path);
    println!("  Subject   : {}", result.subject);
    println!();
    println!(
        "  Score     : {}/100 ({}) — {}",
        result.score, result.level, result.threat_label
    );
    println!();
    for line in result.explanation.render_text().lines() {
        println!("  {line}");
    }

    if result.urls.is_empty() {
        println!("  🔗 Links: none found");
    } else {
        println!("  🔗 Links:");
        for url in &result.urls {
            println!("     • {} (risk {}): {}", url.url, url.risk, url.explanation);
        }
    }

    if result.attachments.is_empty() {
        println!("  📎 Attachments: no attachments found");
    } else {
        println!("  📎 Attachments:");
        for attachment in &result.attachments {
            println!(
                "     • {} (risk {}): {}",
                attachment.filename, attachment.risk, attachment.explanation
            );
        }
    }

    if !result.indicators.is_empty() {
        println!("  🚩 Indicators:");
        for finding in &result.indicators {
            println!("     • [+{}] {}", finding.weight, finding.description);
        }
    }

    println!();
    println!("  Recommended action:");
    for line in result.level.recommended_actions().lines() {
        println!("  {line}");
    }
}

fn show_history(config: &Config, count: usize) {
    let log_sink = match ResultLog::open(&config.csv_log_path, &config.database_path) {
        Ok(log_sink) => log_sink,
        Err(e) => {
            eprintln!("❌ Failed to open analysis logs: {e}");
            process::exit(1);
        }
    };

    let summary = match log_sink.summary() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("❌ Failed to read analysis history: {e}");
            process::exit(1);
        }
    };

    println!("📊 mailscore Analysis History");
    println!("═══════════════════════════════════════");
    println!("  Total analyzed: {}", summary.total);
    if summary.total > 0 {
        println!("  ├─ LOW    : {}", summary.low);
        println!("  ├─ MEDIUM : {}", summary.medium);
        println!("  └─ HIGH   : {}", summary.high);
    }
    println!();

    match log_sink.recent(count) {
        Ok(recent) if recent.is_empty() => {
            println!("📭 No analyses logged yet");
        }
        Ok(recent) => {
            println!("🕑 Most recent ({} shown):", recent.len());
            for result in recent {
                println!(
                    "  {}  {:>3}/100  {:<6}  {}",
                    result.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    result.score,
                    result.level.to_string(),
                    result.file
                );
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to read analysis history: {e}");
            process::exit(1);
        }
    }
}
