//! Clausewise - LLM-powered insurance policy clause analyzer
//!
//! A CLI tool that runs a fixed set of analyzers (plain-English rewrite,
//! compliance, scenarios, translations, risk, training, benchmarking) over
//! policy clauses using Gemini, with heuristic fallbacks when the model is
//! unavailable.
//!
//! Exit codes:
//!   0 - Success (no clause above threshold, or no --fail-on-risk set)
//!   1 - Runtime error (config, unreadable document, report write, etc.)
//!   2 - Clause risk at or above the --fail-on-risk threshold

mod agents;
mod analysis;
mod cli;
mod config;
mod document;
mod llm;
mod models;
mod report;
mod text;

use anyhow::{bail, Context, Result};
use analysis::{BatchSummary, ClauseAnalyzer, HistoryLog, HistoryStats};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use llm::{GeminiClient, ModelClient, OfflineClient};
use models::RiskLevel;
use report::ReportOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Clausewise v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = if args.stats {
        run_stats(&args)
    } else {
        run_analysis(args).await
    };

    match result {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .clausewise.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the model, concurrency, history and report sections.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Handle --stats: print analytics over the history log.
fn run_stats(args: &Args) -> Result<i32> {
    let config = load_config(args)?;
    let log = HistoryLog::new(&config.general.history_file);

    let results = log.load()?;
    if results.is_empty() {
        println!("📭 No analyses recorded in {}", log.path().display());
        return Ok(0);
    }

    println!("📈 Analysis history ({})\n", log.path().display());
    println!("{}", HistoryStats::from_results(&results).to_text());
    Ok(0)
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
async fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Gather clauses
    let clauses = gather_clauses(&args, config.general.max_clauses)?;
    println!("📄 {} clause(s) to analyze", clauses.len());

    // Step 2: Build the model client
    let client = build_client(&args, &config)?;
    println!("🤖 Model: {}", client.model_name());
    if !args.offline {
        println!("   API: {}", config.model.api_url);
        println!("   Timeout: {}s", config.model.timeout_seconds);
    }

    // Step 3: Run the analyzers
    println!("\n🔬 Running clause analysis...");
    let analyzer = ClauseAnalyzer::new(client);
    let progress = progress_bar(clauses.len(), args.quiet)?;

    let results = match progress {
        Some(pb) => {
            let results = analyzer
                .analyze_batch_with(&clauses, config.general.concurrency, |_| pb.inc(1))
                .await;
            pb.finish_and_clear();
            results
        }
        None => analyzer.analyze_batch(&clauses, config.general.concurrency).await,
    };

    for result in &results {
        debug!(
            "Clause {} analyzed: risk {} ({})",
            result.analysis_id, result.risk_score.risk_score, result.risk_score.risk_level
        );
        for (kind, error) in result.failed_units() {
            warn!("Analyzer {} failed for clause {}: {}", kind.key(), result.analysis_id, error);
        }
    }

    // Step 4: Record history
    if config.general.save_history {
        let log = HistoryLog::new(&config.general.history_file);
        log.record(&results);
        info!("History updated: {}", log.path().display());
    }

    // Step 5: Generate and save the report
    println!("\n📝 Generating report...");

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&results)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&results, &ReportOptions::from(&config.report))
        }
    };

    std::fs::write(&config.general.output, &output)
        .with_context(|| format!("Failed to write report to {}", config.general.output))?;

    // Print summary
    let summary = BatchSummary::from_results(&results);
    let duration = start_time.elapsed().as_secs_f64();

    println!("\n📊 Analysis Summary:");
    println!("   Clauses analyzed: {}", summary.clauses);
    println!(
        "   - {} High: {} | {} Medium: {} | {} Low: {}",
        RiskLevel::High.emoji(),
        summary.high_risk,
        RiskLevel::Medium.emoji(),
        summary.medium_risk,
        RiskLevel::Low.emoji(),
        summary.low_risk
    );
    println!("   Average risk score: {:.1}", summary.average_risk_score);
    println!("   Average compliance score: {:.1}", summary.average_compliance_score);
    if summary.fallback_units > 0 || summary.failed_units > 0 {
        println!(
            "   Analyzers on fallback: {} | failed: {}",
            summary.fallback_units, summary.failed_units
        );
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        config.general.output
    );

    // Check --fail-on-risk threshold
    if let Some(threshold) = args.fail_on_risk {
        let threshold = RiskLevel::from(threshold);
        if summary.highest_risk().is_some_and(|level| level >= threshold) {
            eprintln!(
                "\n⛔ Clause risk at or above {} found. Failing (exit code 2).",
                threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Clauses from --clause, or split out of the --file document.
fn gather_clauses(args: &Args, max_clauses: usize) -> Result<Vec<String>> {
    if let Some(ref clause) = args.clause {
        return Ok(vec![clause.trim().to_string()]);
    }

    let Some(ref path) = args.file else {
        bail!("No clause or document given");
    };

    info!("Reading policy document: {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let clauses = document::split_clauses(&content, max_clauses);
    if clauses.is_empty() {
        bail!("No clauses found in {}", path.display());
    }

    Ok(clauses)
}

/// Offline client for --offline, otherwise Gemini.
fn build_client(args: &Args, config: &Config) -> Result<Arc<dyn ModelClient>> {
    if args.offline {
        info!("Offline mode: model calls disabled");
        return Ok(Arc::new(OfflineClient));
    }

    let gemini = config.model.gemini_config(args.api_key.clone());
    if gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; analyzers will use their fallbacks");
    }

    let client = GeminiClient::new(gemini).context("Failed to create Gemini client")?;
    Ok(Arc::new(client))
}

fn progress_bar(len: usize, quiet: bool) -> Result<Option<ProgressBar>> {
    if quiet || len < 2 {
        return Ok(None);
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clauses ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
