//! Kolosal Explain CLI Module
//!
//! Command-line interface for producing explainability bundles and
//! checking feature stability between two datasets.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use ndarray::{Array2, Axis};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::audit::StabilityReport;
use crate::config::{ExplainConfig, TaskType};
use crate::data::{load_csv, Dataset};
use crate::drift::{compute_psi, PsiSeverity};
use crate::models::ModelSpec;
use crate::pipeline::ExplainablePipeline;
use crate::reason_codes::{load_templates, Direction};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn severity_label(severity: PsiSeverity) -> ColoredString {
    match severity {
        PsiSeverity::Stable => ok("stable"),
        PsiSeverity::Moderate => "moderate".yellow(),
        PsiSeverity::Severe => "severe".red().bold(),
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kolosal-explain")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Audit-ready explainability artifacts for tabular models")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Explain a model over a dataset and write the audit bundle
    Explain {
        /// Input data file (CSV with header)
        #[arg(short, long)]
        data: PathBuf,

        /// Model description (JSON with kind, weights, intercept)
        #[arg(short, long)]
        model: PathBuf,

        /// Target column name; enables global importances
        #[arg(short, long)]
        target: Option<String>,

        /// Second dataset to compare against for PSI
        #[arg(long)]
        score_data: Option<PathBuf>,

        /// Row to explain locally (clamped to the last row)
        #[arg(long, default_value = "0")]
        sample_index: usize,

        /// Explanation config (JSON); flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reason-code templates (JSON)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Task type (classification, regression)
        #[arg(long)]
        task: Option<String>,

        /// Number of features to surface
        #[arg(long)]
        top_k: Option<usize>,

        /// Permutation repeats
        #[arg(long)]
        n_repeats: Option<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Model name recorded in artifacts
        #[arg(long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = "artifacts")]
        output: PathBuf,
    },

    /// Compute per-feature PSI between two datasets
    Psi {
        /// Reference data file
        #[arg(short, long)]
        reference: PathBuf,

        /// Comparison data file
        #[arg(short, long)]
        comparison: PathBuf,

        /// Number of quantile bins
        #[arg(short, long, default_value = "10")]
        bins: usize,

        /// Write scores to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options for the `explain` command
pub struct ExplainArgs {
    pub data: PathBuf,
    pub model: PathBuf,
    pub target: Option<String>,
    pub score_data: Option<PathBuf>,
    pub sample_index: usize,
    pub config: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub task: Option<String>,
    pub top_k: Option<usize>,
    pub n_repeats: Option<usize>,
    pub seed: Option<u64>,
    pub name: Option<String>,
    pub output: PathBuf,
}

// ─── Data loading ──────────────────────────────────────────────────────────────

fn load_dataset(path: &Path, target: Option<&str>) -> anyhow::Result<Dataset> {
    step_run(&format!("Loading {}", path.display()));
    let start = Instant::now();
    let dataset = load_csv(path, target)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    step_done(&format!(
        "{} rows × {} features in {:?}",
        dataset.x.nrows(),
        dataset.feature_names.len(),
        start.elapsed()
    ));
    Ok(dataset)
}

/// Select `names` from `dataset` in the given order
fn align_columns(dataset: &Dataset, names: &[String]) -> anyhow::Result<Array2<f64>> {
    let indices = names
        .iter()
        .map(|name| {
            dataset
                .feature_names
                .iter()
                .position(|n| n == name)
                .with_context(|| format!("Column {} missing from comparison data", name))
        })
        .collect::<anyhow::Result<Vec<usize>>>()?;
    Ok(dataset.x.select(Axis(1), &indices))
}

fn resolve_config(args: &ExplainArgs) -> anyhow::Result<ExplainConfig> {
    let mut config = match &args.config {
        Some(path) => ExplainConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExplainConfig::default(),
    };

    if let Some(task) = &args.task {
        config = config.with_task(TaskType::parse(task)?);
    }
    if let Some(top_k) = args.top_k {
        config = config.with_top_k(top_k);
    }
    if let Some(n_repeats) = args.n_repeats {
        config = config.with_n_repeats(n_repeats);
    }
    if let Some(seed) = args.seed {
        config = config.with_random_state(seed);
    }
    if let Some(name) = &args.name {
        config = config.with_model_name(name.clone());
    }

    config.validate()?;
    Ok(config)
}

// ─── Explain ───────────────────────────────────────────────────────────────────

pub fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    section("Explain");

    let config = resolve_config(&args)?;
    let dataset = load_dataset(&args.data, args.target.as_deref())?;

    let spec = ModelSpec::from_json_file(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;
    if spec.n_features() != dataset.feature_names.len() {
        anyhow::bail!(
            "Model expects {} features but {} has {}",
            spec.n_features(),
            args.data.display(),
            dataset.feature_names.len()
        );
    }

    let score_x = match &args.score_data {
        Some(path) => {
            let score = load_dataset(path, None)?;
            Some(align_columns(&score, &dataset.feature_names)?)
        }
        None => None,
    };

    let mut pipeline = ExplainablePipeline::new(
        spec.into_model(),
        dataset.feature_names.clone(),
        config.clone(),
    )?;
    if let Some(path) = &args.templates {
        let templates = load_templates(path)
            .with_context(|| format!("Failed to load templates {}", path.display()))?;
        step_ok(&format!("Loaded {} reason templates", templates.len()));
        pipeline = pipeline.with_reason_templates(templates);
    }

    info!(
        task = %config.task,
        top_k = config.top_k,
        n_repeats = config.n_repeats,
        "Explaining model"
    );

    step_run("Computing explanations");
    let start = Instant::now();
    let bundle = pipeline.explain_batch(
        &dataset.x,
        dataset.target.as_ref(),
        score_x.as_ref(),
        args.sample_index,
    )?;
    step_done(&format!("{:?}", start.elapsed()));

    if dataset.target.is_none() {
        println!("  {}", dim("no target column given; global importances are zero"));
    }

    section("Global Importance");
    for (name, score) in &bundle.global_explanations.permutation_importance {
        println!("  {:<24} {}", muted(name), format!("{:+.4}", score).white());
    }

    section(&format!("Reason Codes (row {})", bundle.local_explanations.sample_index));
    for rc in &bundle.reason_codes {
        let arrow = match rc.direction {
            Direction::Up => "▲".red(),
            Direction::Down => "▼".green(),
        };
        println!("  {} {} {}", accent(&rc.code), arrow, rc.message);
    }

    if let Some(stability) = &bundle.stability {
        print_psi(stability);
    }

    let bundle_path = args.output.join("explainability_bundle.json");
    let card_path = args.output.join("model_card.md");
    bundle.save_json(&bundle_path)?;
    bundle.save_model_card(&card_path)?;

    println!();
    line_box_top();
    line_box(&kv("Bundle    ", &bundle_path.display().to_string()));
    line_box(&kv("Model card", &card_path.display().to_string()));
    line_box_bottom();
    println!();

    Ok(())
}

// ─── PSI ───────────────────────────────────────────────────────────────────────

fn print_psi(report: &StabilityReport) {
    section(&format!("Stability (PSI, {} bins)", report.bins));
    println!("  {:<24} {:>10} {:>10}", muted("Feature"), muted("PSI"), muted("Severity"));
    println!("  {}", dim(&"─".repeat(46)));
    for (name, psi) in &report.psi {
        println!(
            "  {:<24} {:>10} {:>10}",
            name,
            format!("{:.4}", psi),
            severity_label(PsiSeverity::classify(*psi))
        );
    }
}

pub fn cmd_psi(reference: &Path, comparison: &Path, bins: usize, output: Option<&Path>) -> anyhow::Result<()> {
    section("Population Stability");

    let reference = load_dataset(reference, None)?;
    let comparison = load_dataset(comparison, None)?;
    let comparison_x = align_columns(&comparison, &reference.feature_names)?;

    let psi = compute_psi(&reference.x, &comparison_x, &reference.feature_names, bins)?;
    let report = StabilityReport { psi, bins };

    let n_shifted = report
        .psi
        .values()
        .filter(|v| PsiSeverity::classify(**v) != PsiSeverity::Stable)
        .count();
    info!(n_features = report.psi.len(), n_shifted, bins, "Computed PSI");

    print_psi(&report);
    println!();

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        step_ok(&format!("Scores written to {}", path.display()));
        println!();
    }

    Ok(())
}
