use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use financial_metrics_builder::{
    AnalysisOptions, FileSink, FinancialAnalyzer, OutputFormat, SummaryTemplate,
};
use log::{error, info, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "fin-metrics",
    about = "Derived ratios and common-size tables from extracted financial summaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one or more summary JSON files
    Analyze {
        /// Summary records, e.g. json_files/summary.json
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory receiving <stem>_analysis and <stem>_vertical files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// JSON file with analysis options; flags below override it
        #[arg(long)]
        options: Option<PathBuf>,

        #[arg(long)]
        significant_digits: Option<u32>,

        #[arg(long)]
        percent_decimals: Option<usize>,

        #[arg(long)]
        days_in_period: Option<f64>,
    },
    /// Print the JSON Schema of the summary record expected as input
    Schema,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Schema => {
            println!("{}", SummaryTemplate::schema_as_json()?);
            Ok(())
        }
        Command::Analyze {
            inputs,
            out_dir,
            format,
            options,
            significant_digits,
            percent_decimals,
            days_in_period,
        } => {
            let mut analysis_options = match options {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading options {}", path.display()))?;
                    serde_json::from_str(&text)
                        .with_context(|| format!("parsing options {}", path.display()))?
                }
                None => AnalysisOptions::default(),
            };
            if let Some(digits) = significant_digits {
                analysis_options.significant_digits = digits;
            }
            if let Some(decimals) = percent_decimals {
                analysis_options.percent_decimals = decimals;
            }
            if let Some(days) = days_in_period {
                analysis_options.days_in_period = days;
            }

            let analyzer = FinancialAnalyzer::new(analysis_options)?;
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;

            let stems = output_stems(&inputs)?;
            let failures = inputs
                .par_iter()
                .zip(stems.par_iter())
                .filter(|(input, stem)| {
                    match analyze_file(&analyzer, input, stem, &out_dir, format.into()) {
                        Ok(()) => false,
                        Err(e) => {
                            error!("{}: {:#}", input.display(), e);
                            true
                        }
                    }
                })
                .count();

            if failures > 0 {
                anyhow::bail!("{} of {} inputs failed", failures, inputs.len());
            }
            Ok(())
        }
    }
}

/// One output stem per input. Inputs sharing a file stem (`a/summary.json`,
/// `b/summary.json`) get their command-line position appended.
fn output_stems(inputs: &[PathBuf]) -> Result<Vec<String>> {
    let stems: Vec<&str> = inputs
        .iter()
        .map(|input| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("summary")
        })
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(*stem).or_default() += 1;
    }

    let unique: Vec<String> = stems
        .iter()
        .enumerate()
        .map(|(index, stem)| {
            if counts[stem] > 1 {
                format!("{}_{}", stem, index + 1)
            } else {
                stem.to_string()
            }
        })
        .collect();

    let mut seen = HashSet::new();
    if let Some(clash) = unique.iter().find(|stem| !seen.insert(stem.as_str())) {
        anyhow::bail!("several inputs would write to {}_analysis", clash);
    }
    Ok(unique)
}

fn analyze_file(
    analyzer: &FinancialAnalyzer,
    input: &Path,
    stem: &str,
    out_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    let text =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;

    let output = |suffix: &str| {
        out_dir.join(format!("{}_{}.{}", stem, suffix, format.extension()))
    };

    let mut metrics_sink = FileSink::with_format(output("analysis"), format);
    match analyzer.write_metrics_to(&raw, &mut metrics_sink) {
        Err(e) if e.is_not_computed() => {
            warn!("Skipping {}: {}", input.display(), e);
            return Ok(());
        }
        result => {
            result?;
        }
    }

    let mut vertical_sink = FileSink::with_format(output("vertical"), format);
    analyzer.write_vertical_to(&raw, &mut vertical_sink)?;

    info!(
        "Analyzed {} into {} and {}",
        input.display(),
        metrics_sink.path().display(),
        vertical_sink.path().display()
    );
    Ok(())
}
