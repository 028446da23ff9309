//! Analyze local documents without running the HTTP server.
//!
//! Runs the same extraction and analysis pipeline as `POST /upload` over files or directory
//! trees, optionally answering a question and classifying sentiment for each document.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use docinsight::{
    analysis::{Answer, OutcomeStatus, Sentiment},
    config,
    extraction::DocumentKind,
    service::{DocumentApi, DocumentReport, DocumentService},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "docinsight-cli",
    about = "Summarize, question, and sentiment-tag local documents"
)]
struct Cli {
    /// Files or directories (walked recursively) to analyze.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Question to answer from each document.
    #[arg(long)]
    question: Option<String>,
    /// Also classify each document's sentiment.
    #[arg(long)]
    sentiment: bool,
    /// Print a JSON array instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    #[serde(flatten)]
    document: DocumentReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<AnswerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentiment: Option<SentimentReport>,
}

#[derive(Serialize)]
struct AnswerReport {
    status: OutcomeStatus,
    #[serde(flatten)]
    answer: Answer,
}

#[derive(Serialize)]
struct SentimentReport {
    status: OutcomeStatus,
    #[serde(flatten)]
    sentiment: Sentiment,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let documents = collect_documents(&cli.paths)?;
    if documents.is_empty() {
        bail!("no supported documents found (pdf, png, jpg, jpeg, docx, txt)");
    }

    let service = DocumentService::from_config(config).context("failed to configure models")?;
    let mut reports = Vec::with_capacity(documents.len());
    let mut failures = 0usize;
    for path in documents {
        match analyze(&service, &cli, &path).await {
            Ok(report) => {
                if !cli.json {
                    print_report(&report);
                }
                reports.push(report);
            }
            Err(err) => {
                failures += 1;
                eprintln!("{}: {err:#}", path.display());
            }
        }
    }

    if cli.json {
        let rendered =
            serde_json::to_string_pretty(&reports).context("failed to render JSON report")?;
        println!("{rendered}");
    }
    if failures > 0 {
        bail!("{failures} document(s) could not be analyzed");
    }
    Ok(())
}

async fn analyze(service: &DocumentService, cli: &Cli, path: &Path) -> Result<FileReport> {
    let document = service
        .analyze_file(path.to_path_buf())
        .await
        .context("analysis failed")?;

    let answer = match cli.question.as_deref() {
        Some(question) => {
            let outcome = service.answer_question(question, &document.full_text).await;
            Some(AnswerReport {
                status: outcome.status(),
                answer: outcome.resolve(Answer::error),
            })
        }
        None => None,
    };

    let sentiment = if cli.sentiment {
        let outcome = service.analyze_sentiment(&document.full_text).await;
        Some(SentimentReport {
            status: outcome.status(),
            sentiment: outcome.resolve(|_| Sentiment::error()),
        })
    } else {
        None
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        document,
        answer,
        sentiment,
    })
}

/// Expand directories and keep files with a supported extension, in a stable order.
fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for root in paths {
        if !root.exists() {
            bail!("{} does not exist", root.display());
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let supported =
                DocumentKind::from_filename(&entry.file_name().to_string_lossy()).is_ok();
            if supported {
                documents.push(entry.into_path());
            } else if entry.depth() == 0 {
                eprintln!("skipping {}: unsupported file type", root.display());
            }
        }
    }
    Ok(documents)
}

fn print_report(report: &FileReport) {
    let document = &report.document;
    println!("== {}", report.path.display());
    println!("Words: {}", document.word_count);
    println!("\nSummary:\n{}", document.summary);
    println!("\nKey points:");
    for point in &document.key_points {
        println!("  - {point}");
    }
    println!("\nSuggested questions:");
    for question in &document.suggested_questions {
        println!("  - {question}");
    }
    if let Some(answer) = &report.answer {
        println!(
            "\nAnswer ({:.2}): {}\n  {}",
            answer.answer.confidence, answer.answer.answer, answer.answer.explanation
        );
    }
    if let Some(sentiment) = &report.sentiment {
        println!(
            "\nSentiment: {} ({:.2}) - {}",
            sentiment.sentiment.label, sentiment.sentiment.score, sentiment.sentiment.description
        );
    }
    for warning in &document.warnings {
        println!("warning: {warning}");
    }
    println!();
}
