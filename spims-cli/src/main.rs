use clap::{ArgGroup, Parser};
use serde::{Deserialize, Serialize};
use spims::io::{load_pattern, load_source};
use spims::{
    CoarseFactorPolicy, MatchConfig, MatchRecord, Matcher, Pattern, ScanParams, SearchMode,
    ThresholdPolicy,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Find occurrences of pattern images inside source images")]
#[command(group(ArgGroup::new("patterns").args(["pattern", "pdir"])))]
#[command(group(ArgGroup::new("sources").args(["source", "sdir"])))]
struct Cli {
    /// Pattern image file.
    #[arg(short, long, value_name = "FILE")]
    pattern: Option<PathBuf>,
    /// Directory of pattern images.
    #[arg(long, value_name = "DIR")]
    pdir: Option<PathBuf>,
    /// Source image file.
    #[arg(short, long, value_name = "FILE")]
    source: Option<PathBuf>,
    /// Directory of source images.
    #[arg(long, value_name = "DIR")]
    sdir: Option<PathBuf>,
    /// Optional JSON file overriding matcher constants.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Append the confidence to every match line.
    #[arg(long)]
    confidence: bool,
    /// Print all matches as a JSON array.
    #[arg(long)]
    json: bool,
    /// Only try the pattern at its native size.
    #[arg(long)]
    fixed_scale: bool,
    /// Print timing diagnostics after the matches.
    #[arg(long)]
    diag: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ThresholdJson {
    flat_std: f32,
    coarse_flat_offset: f32,
    coarse_flat_cap: f32,
    fine_flat: f32,
    coarse_sigma: f32,
    coarse_cap: f32,
    fine_sigma: f32,
    fine_cap: f32,
}

impl Default for ThresholdJson {
    fn default() -> Self {
        let t = ThresholdPolicy::default();
        Self {
            flat_std: t.flat_std,
            coarse_flat_offset: t.coarse_flat_offset,
            coarse_flat_cap: t.coarse_flat_cap,
            fine_flat: t.fine_flat,
            coarse_sigma: t.coarse_sigma,
            coarse_cap: t.coarse_cap,
            fine_sigma: t.fine_sigma,
            fine_cap: t.fine_cap,
        }
    }
}

impl From<ThresholdJson> for ThresholdPolicy {
    fn from(value: ThresholdJson) -> Self {
        Self {
            flat_std: value.flat_std,
            coarse_flat_offset: value.coarse_flat_offset,
            coarse_flat_cap: value.coarse_flat_cap,
            fine_flat: value.fine_flat,
            coarse_sigma: value.coarse_sigma,
            coarse_cap: value.coarse_cap,
            fine_sigma: value.fine_sigma,
            fine_cap: value.fine_cap,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FactorJson {
    large_min_dim: usize,
    large_factor: usize,
    small_min_dim: usize,
    small_factor: usize,
}

impl Default for FactorJson {
    fn default() -> Self {
        let f = CoarseFactorPolicy::default();
        Self {
            large_min_dim: f.large_min_dim,
            large_factor: f.large_factor,
            small_min_dim: f.small_min_dim,
            small_factor: f.small_factor,
        }
    }
}

impl From<FactorJson> for CoarseFactorPolicy {
    fn from(value: FactorJson) -> Self {
        Self {
            large_min_dim: value.large_min_dim,
            large_factor: value.large_factor,
            small_min_dim: value.small_min_dim,
            small_factor: value.small_factor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigJson {
    parallel: bool,
    exact_threshold: f32,
    constant_std: f64,
    min_window_variance: f64,
    score_ceiling: f32,
    slop_std: f64,
    retention_band: f32,
    sample_divisor: usize,
    window_margin: usize,
    overlap_ratio: f64,
    thresholds: ThresholdJson,
    factors: FactorJson,
}

impl Default for ConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            parallel: cfg.parallel,
            exact_threshold: cfg.scan.exact_threshold,
            constant_std: cfg.scan.constant_std,
            min_window_variance: cfg.scan.min_window_variance,
            score_ceiling: cfg.score_ceiling,
            slop_std: cfg.slop_std,
            retention_band: cfg.retention_band,
            sample_divisor: cfg.sample_divisor,
            window_margin: cfg.window_margin,
            overlap_ratio: cfg.overlap_ratio,
            thresholds: ThresholdJson::default(),
            factors: FactorJson::default(),
        }
    }
}

impl From<ConfigJson> for MatchConfig {
    fn from(value: ConfigJson) -> Self {
        Self {
            scan: ScanParams {
                exact_threshold: value.exact_threshold,
                constant_std: value.constant_std,
                min_window_variance: value.min_window_variance,
                thresholds: value.thresholds.into(),
            },
            factors: value.factors.into(),
            score_ceiling: value.score_ceiling,
            slop_std: value.slop_std,
            retention_band: value.retention_band,
            sample_divisor: value.sample_divisor,
            window_margin: value.window_margin,
            overlap_ratio: value.overlap_ratio,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Serialize)]
struct RecordJson<'a> {
    pattern: &'a str,
    source: &'a str,
    confidence: f32,
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

impl<'a> From<&'a MatchRecord> for RecordJson<'a> {
    fn from(value: &'a MatchRecord) -> Self {
        Self {
            pattern: &value.pattern,
            source: &value.source,
            confidence: value.confidence,
            width: value.width,
            height: value.height,
            x: value.x,
            y: value.y,
        }
    }
}

/// Timing of every matched pair.
#[derive(Debug, Default)]
struct Diagnostics {
    pairs: Vec<Duration>,
    comparisons: usize,
}

impl Diagnostics {
    fn print(&self, total: Duration) {
        let secs: Vec<f64> = self.pairs.iter().map(Duration::as_secs_f64).collect();
        let n = secs.len().max(1) as f64;
        let mean = secs.iter().sum::<f64>() / n;
        let var = secs.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
        eprintln!("total time: {:.3}s", total.as_secs_f64());
        eprintln!("pairs: {}", self.pairs.len());
        eprintln!("comparisons: {}", self.comparisons);
        eprintln!("mean pair time: {:.3}s", mean);
        eprintln!("pair time std: {:.3}s", var.sqrt());
    }
}

/// Resolves a file-or-directory flag pair into a sorted list of files.
fn collect_inputs(
    file: Option<&Path>,
    dir: Option<&Path>,
    what: &str,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    match (file, dir) {
        (Some(file), None) => {
            if !file.is_file() {
                return Err(format!("{what} {} is not a regular file", file.display()).into());
            }
            Ok(vec![file.to_path_buf()])
        }
        (None, Some(dir)) => {
            if !dir.is_dir() {
                return Err(format!("{what} directory {} is not a directory", dir.display()).into());
            }
            let mut files = Vec::new();
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    files.push(entry.path());
                }
            }
            files.sort();
            Ok(files)
        }
        _ => Err(format!("exactly one {what} file or directory must be given").into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("spims=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let cfg: MatchConfig = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<ConfigJson>(&text)?.into()
        }
        None => MatchConfig::default(),
    };
    cfg.validate()?;

    let pattern_paths = collect_inputs(cli.pattern.as_deref(), cli.pdir.as_deref(), "pattern")?;
    let source_paths = collect_inputs(cli.source.as_deref(), cli.sdir.as_deref(), "source")?;
    let mode = if cli.fixed_scale {
        SearchMode::Fixed
    } else {
        SearchMode::Scaled
    };

    let started = Instant::now();
    let patterns: Vec<Pattern> = pattern_paths
        .iter()
        .map(load_pattern)
        .collect::<Result<_, _>>()?;
    let matcher = Matcher::new().with_config(cfg);
    let mut diag = Diagnostics::default();
    let mut records = Vec::new();

    for source_path in &source_paths {
        let source = load_source(source_path)?;
        for pattern in &patterns {
            let pair_started = Instant::now();
            let report = matcher.match_pair_report(&source, pattern, mode);
            diag.pairs.push(pair_started.elapsed());
            diag.comparisons += report.stats.comparisons;
            if !cli.json {
                for record in &report.records {
                    if cli.confidence {
                        println!("{record} with {:.2} confidence", record.confidence);
                    } else {
                        println!("{record}");
                    }
                }
            }
            records.extend(report.records);
        }
    }

    if cli.json {
        let out: Vec<RecordJson<'_>> = records.iter().map(RecordJson::from).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    if cli.diag {
        diag.print(started.elapsed());
    }
    Ok(())
}
