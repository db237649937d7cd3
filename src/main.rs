//! Sentinel - Web Security Scanner CLI

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

use sentinel::ai::Summarizer;
use sentinel::check::ScanEngine;
use sentinel::config;
use sentinel::models::{ReportEntry, ScanConfig, ScanReport};
use sentinel::report;

/// Sentinel - Single-Target Web Security Scanner
#[derive(Parser)]
#[command(name = "sentinel", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a security scan against a target URL
    Scan {
        /// Target URL to scan (http or https)
        #[arg(short, long)]
        target: String,

        /// Checks to run (comma-separated, or "all")
        #[arg(short, long, value_delimiter = ',')]
        checks: Option<Vec<String>>,

        /// Custom User-Agent header
        #[arg(long)]
        user_agent: Option<String>,

        /// Directory where the JSON report is written
        #[arg(short, long, default_value = "./reports")]
        output: PathBuf,

        /// Skip the AI-generated summary
        #[arg(long)]
        no_ai: bool,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List available checks
    Checks,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "sentinel=debug"
    } else {
        "sentinel=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════╗
    ║  SENTINEL v0.1.0                     ║
    ║  Web Security Scanner                ║
    ╚══════════════════════════════════════╝
    "#;
    println!("{}", banner.cyan());
}

fn outcome_label(entry: &ReportEntry) -> String {
    match entry {
        ReportEntry::Error { .. } => "error".red().to_string(),
        ReportEntry::Finding(finding) => match finding.vulnerable() {
            Some(true) => "vulnerable".red().bold().to_string(),
            Some(false) => "ok".green().to_string(),
            None => "info".cyan().to_string(),
        },
    }
}

fn print_summary(result: &ScanReport) {
    println!("\n{}", "  Scan Summary".bold());
    println!("  {}", "─".repeat(35));

    let mut builder = Builder::default();
    builder.push_record(["Check", "Outcome"]);
    for (id, entry) in &result.results {
        builder.push_record([id.clone(), outcome_label(entry)]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");

    let vulnerable = result
        .results
        .values()
        .filter(|e| matches!(e, ReportEntry::Finding(f) if f.vulnerable() == Some(true)))
        .count();
    println!(
        "\n  {} {} {}",
        format!("{vulnerable} vulnerable").red().bold(),
        format!("{} errored", result.error_count()).yellow(),
        format!("{} requests sent", result.total_requests).white(),
    );
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            target,
            checks,
            user_agent,
            output,
            no_ai,
            config: config_path,
            verbose,
        } => {
            init_tracing(verbose);
            print_banner();

            let mut scan_config = if let Some(ref path) = config_path {
                config::load_config(path)?
            } else {
                let default_path = Path::new("config/sentinel.toml");
                if default_path.exists() {
                    config::load_config(default_path)?
                } else {
                    ScanConfig::default()
                }
            };

            config::merge_cli_args(&mut scan_config, target, checks, user_agent, no_ai);
            scan_config.ai.apply_env();

            println!("  {} {}", "Target:".bold(), scan_config.target.green());
            println!(
                "  {} {}\n",
                "Checks:".bold(),
                scan_config.checks.join(", ").cyan()
            );

            let engine = ScanEngine::with_defaults();
            let mut result = engine.run(&scan_config).await?;

            if scan_config.ai.enabled {
                let summarizer = Summarizer::new(scan_config.ai.clone());
                result.ai_summary = Some(summarizer.summarize(&result).await);
            }

            print_summary(&result);

            let path = report::json::export(&result, &output)?;
            println!(
                "\n  {} {}",
                "Report saved to:".bold(),
                path.display().to_string().green()
            );
        }

        Commands::Checks => {
            print_banner();
            let engine = ScanEngine::with_defaults();

            println!("  {}\n", "Available Checks:".bold());
            for (id, description) in engine.list_checks() {
                println!("    {} {}", format!("{id:20}").cyan().bold(), description);
            }
            println!();
        }
    }

    Ok(())
}
