use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use contract_clauses::db::{self, AnalysisField, Clause};
use contract_clauses::{compare, DocumentSource, Pipeline, ProcessError, Settings, TextSource};

#[derive(Parser)]
#[command(name = "contract-clauses", about = "Clause extraction and analysis for construction contracts")]
struct Cli {
    /// SQLite database path (overrides CLAUSES_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, analyze and store clauses from contract files (.pdf, .txt, .md)
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Delete all stored clauses first
        #[arg(long)]
        reset: bool,
        #[arg(long)]
        json: bool,
    },
    /// List stored clauses
    List {
        /// Filter by type (general, particular, unknown)
        #[arg(short, long = "type")]
        clause_type: Option<String>,
        /// Search number, title, text, summary and risks
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one clause in full
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Clauses with Employer risks
    Risks {
        #[arg(long)]
        json: bool,
    },
    /// Clauses with time frames
    TimeFrames {
        #[arg(long)]
        json: bool,
    },
    /// Compare General and Particular Conditions by topic
    Compare {
        #[arg(long)]
        json: bool,
    },
    /// Clause counts
    Stats,
    /// Delete all stored clauses
    Reset,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("loading CLAUSES_* settings")?;
    let db_path = cli.db.unwrap_or_else(|| PathBuf::from(&settings.db_path));

    let conn = db::connect(&db_path).with_context(|| format!("opening {}", db_path.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Process { files, reset, json } => {
            if reset {
                let n = db::delete_all(&conn)?;
                info!(deleted = n, "Reset clause store");
            }
            let reports = process_files(&conn, &settings, &files)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for r in &reports {
                    match &r.error {
                        None => println!("{}: {} clauses", r.file, r.count),
                        Some(e) => println!("{}: failed: {}", r.file, e),
                    }
                }
                let saved: usize = reports.iter().map(|r| r.count).sum();
                println!("\nSaved {} clauses from {} files.", saved, reports.len());
            }
        }
        Commands::List { clause_type, search, json } => {
            let clauses = db::list_clauses(&conn, clause_type.as_deref(), search.as_deref())?;
            print_clauses(&clauses, json)?;
        }
        Commands::Show { id, json } => {
            let clause = db::get_clause(&conn, id)?.with_context(|| format!("clause {id} not found"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&clause)?);
            } else {
                print_clause(&clause);
            }
        }
        Commands::Risks { json } => {
            let clauses = db::list_with_nonempty(&conn, AnalysisField::RiskSummary)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&clauses)?);
            } else {
                for c in &clauses {
                    println!("── {} ──", heading(c));
                    println!("{}\n", c.row.risk_summary.as_deref().unwrap_or_default());
                }
                println!("{} clauses with Employer risks", clauses.len());
            }
        }
        Commands::TimeFrames { json } => {
            let clauses = db::list_with_nonempty(&conn, AnalysisField::TimeFramesRaw)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&clauses)?);
            } else {
                for c in &clauses {
                    println!("── {} ──", heading(c));
                    let explained = c.row.time_frames_explained.as_deref();
                    println!("{}\n", explained.or(c.row.time_frames_raw.as_deref()).unwrap_or_default());
                }
                println!("{} clauses with time frames", clauses.len());
            }
        }
        Commands::Compare { json } => {
            let clauses = db::list_clauses(&conn, None, None)?;
            let entries = compare::compare(&clauses);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No General or Particular Conditions stored.");
            } else {
                println!("{:<28} | {:<24} | {:<24} | {}", "Topic", "General", "Particular", "Comment");
                println!("{}", "-".repeat(120));
                for e in &entries {
                    let side = |p: &Option<compare::ClausePreview>| match p {
                        Some(p) => truncate(
                            &format!(
                                "{} {}",
                                p.clause_number.as_deref().unwrap_or("-"),
                                p.clause_title.as_deref().unwrap_or_default()
                            ),
                            24,
                        ),
                        None => "-".to_string(),
                    };
                    println!(
                        "{:<28} | {:<24} | {:<24} | {}",
                        truncate(&e.topic, 28),
                        side(&e.general),
                        side(&e.particular),
                        e.comment
                    );
                }
            }
        }
        Commands::Stats => {
            let s = db::stats(&conn)?;
            println!("Total:        {}", s.total);
            println!("General:      {}", s.general);
            println!("Particular:   {}", s.particular);
            println!("Unknown:      {}", s.unknown);
            println!("With risks:   {}", s.with_risks);
            println!("With times:   {}", s.with_time_frames);
        }
        Commands::Reset => {
            let n = db::delete_all(&conn)?;
            println!("Deleted {} clauses.", n);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

#[derive(Serialize)]
struct DocumentReport {
    file: String,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    clauses: Vec<Clause>,
    processed_at: DateTime<Utc>,
}

/// Extraction and analysis run in parallel; saving is sequential, one
/// transaction per document.
fn process_files(
    conn: &rusqlite::Connection,
    settings: &Settings,
    files: &[PathBuf],
) -> anyhow::Result<Vec<DocumentReport>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let source = DocumentSource::new(settings);
    let pipeline = Pipeline::from_settings(settings);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let analyzed: Vec<_> = files
        .par_iter()
        .map(|path| {
            let result = source
                .extract(path)
                .map_err(ProcessError::from)
                .and_then(|extraction| pipeline.analyze_document(&extraction));
            pb.inc(1);
            (path, result)
        })
        .collect();
    pb.finish_and_clear();

    let mut reports = Vec::with_capacity(analyzed.len());
    for (path, result) in analyzed {
        let file = path.display().to_string();
        let outcome = result.and_then(|rows| Ok(db::save_clauses(conn, &rows)?));
        let report = match outcome {
            Ok(clauses) => {
                info!(file = %file, saved = clauses.len(), "Processed document");
                DocumentReport {
                    file,
                    count: clauses.len(),
                    error: None,
                    clauses,
                    processed_at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(file = %file, error = %e, "Document not processed");
                DocumentReport {
                    file,
                    count: 0,
                    error: Some(e.to_string()),
                    clauses: Vec::new(),
                    processed_at: Utc::now(),
                }
            }
        };
        reports.push(report);
    }
    Ok(reports)
}

fn heading(c: &Clause) -> String {
    format!(
        "#{} {} {}",
        c.id,
        c.row.clause_number.as_deref().unwrap_or("-"),
        c.row.clause_title.as_deref().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

fn print_clauses(clauses: &[Clause], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(clauses)?);
        return Ok(());
    }
    if clauses.is_empty() {
        println!("No clauses found.");
        return Ok(());
    }

    println!("{:>5} | {:<8} | {:<40} | {:<20} | {:<24}", "ID", "Number", "Title", "Type", "Section");
    println!("{}", "-".repeat(110));
    for c in clauses {
        println!(
            "{:>5} | {:<8} | {:<40} | {:<20} | {:<24}",
            c.id,
            truncate(c.row.clause_number.as_deref().unwrap_or("-"), 8),
            truncate(c.row.clause_title.as_deref().unwrap_or_default(), 40),
            c.row.clause_type,
            truncate(c.row.section_name.as_deref().unwrap_or_default(), 24),
        );
    }
    println!("\n{} clauses | details: show <ID>", clauses.len());
    Ok(())
}

fn print_clause(c: &Clause) {
    let r = &c.row;
    println!("{}", heading(c));
    println!("Type:     {}", r.clause_type);
    if let Some(section) = &r.section_name {
        println!("Section:  {}", section);
    }
    println!("Created:  {}", c.created_at);
    println!("\n{}", r.text_original);

    for (label, value) in [
        ("Summary", &r.summary),
        ("Risks on Employer", &r.risk_summary),
        ("Time frames", &r.time_frames_explained),
    ] {
        if let Some(v) = value {
            println!("\n--- {} ---\n{}", label, v);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
