//! Compare the proteins identified in two Mascot searches, e.g. a knockout
//! (condition A) against its wild type (condition B)
//!
//! ```text
//! compare KO-ALL_with_pipes.csv WT-ALL_with_pipes.csv 100.0 30.0 \
//!     KO_unique_proteins.xlsx WT_unique_proteins.xlsx \
//!     unique_proteins_and_differential_expression.xlsx
//! ```
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use mascot::report::Report;
use mascot::{BestHitMap, ParseConfig, Reconciliation};
use std::path::{Path, PathBuf};

mod xlsx;

/// Compare Mascot protein hits between two conditions and report the
/// differential expression of shared proteins
#[derive(Debug, Parser)]
#[command(version, allow_negative_numbers = true)]
struct Cli {
    /// Mascot export of condition A
    condition_a: PathBuf,
    /// Mascot export of condition B
    condition_b: PathBuf,
    /// Largest peptide expectancy value a match may have
    expectancy_cutoff: f64,
    /// Smallest peptide score a match may have
    score_cutoff: f64,
    /// Output workbook listing the proteins of condition A
    report_a: PathBuf,
    /// Output workbook listing the proteins of condition B
    report_b: PathBuf,
    /// Output workbook with exclusive proteins and differential expression
    combined_report: PathBuf,
    /// Field delimiter of the Mascot exports
    #[arg(long, default_value_t = '|')]
    delimiter: char,
    /// Name of condition A in sheet names and column headers
    #[arg(long, default_value = "KO")]
    label_a: String,
    /// Name of condition B in sheet names and column headers
    #[arg(long, default_value = "WT")]
    label_b: String,
}

impl Cli {
    fn parse_config(&self) -> Result<ParseConfig> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        mascot::report::check_labels(&self.label_a, &self.label_b)
            .context("choose shorter condition labels with --label-a/--label-b")?;
        Ok(ParseConfig::new(self.expectancy_cutoff, self.score_cutoff)
            .delimiter(self.delimiter as u8))
    }
}

fn write_report(report: &Report<'_>, path: &Path) -> Result<()> {
    xlsx::write(report, path).with_context(|| format!("writing report {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    run(&Cli::parse())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.parse_config()?;

    // Each map is complete before it leaves its task
    let (a, b) = rayon::join(
        || BestHitMap::load(&cli.condition_a, &config),
        || BestHitMap::load(&cli.condition_b, &config),
    );
    let a = a?;
    info!("{} proteins identified: {}", cli.label_a, a.len());
    let b = b?;
    info!("{} proteins identified: {}", cli.label_b, b.len());

    let rec = Reconciliation::new(&a, &b)?;
    info!(
        "Common proteins identified: {} ({} only in {}, {} only in {})",
        rec.common.len(),
        rec.only_in_a.len(),
        cli.label_a,
        rec.only_in_b.len(),
        cli.label_b
    );

    write_report(&Report::condition(&cli.label_a, &a), &cli.report_a)?;
    info!("{} report ready: {}", cli.label_a, cli.report_a.display());

    write_report(&Report::condition(&cli.label_b, &b), &cli.report_b)?;
    info!("{} report ready: {}", cli.label_b, cli.report_b.display());

    write_report(
        &Report::combined(&cli.label_a, &cli.label_b, &rec),
        &cli.combined_report,
    )?;
    info!("Combined report ready: {}", cli.combined_report.display());

    Ok(())
}
