// Entry point and high-level CLI flow.
//
// Loads the accident CSV, imputes and filters it, writes the cleaned table,
// then builds the aggregate report, writes it as JSON and prints markdown
// previews of each table.
use accident_report::output::{preview_table, write_dataset_csv, write_json};
use accident_report::util::format_int;
use accident_report::{build_run_report, clean, load_dataset, PipelineConfig, SexDistribution};
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean, deduplicate and summarise a per-person traffic accident dataset"
)]
struct Args {
    /// Input CSV with one row per person involved in an accident
    #[arg(short, long)]
    input: String,

    /// Where to write the cleaned rows
    #[arg(short, long, default_value = "accidents_clean.csv")]
    output: String,

    /// Where to write the aggregate report as JSON
    #[arg(short, long, default_value = "accident_report.json")]
    report: String,

    /// Field delimiter of the input and output CSV
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Seed for sex imputation draws (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Share of unassigned sex values resolved to male
    #[arg(long, default_value_t = 0.468)]
    male_proportion: f64,

    /// Rows with more missing-value markers than this are dropped
    #[arg(long, default_value_t = 1)]
    max_sentinels: usize,

    /// Text that marks a missing categorical value
    #[arg(long, default_value = "NO ASIGNADO")]
    sentinel: String,

    /// Rows shown per table preview
    #[arg(long, default_value_t = 16)]
    preview_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character");
    }
    let delimiter = args.delimiter as u8;

    let mut builder = PipelineConfig::builder()
        .sentinel(args.sentinel.clone())
        .max_sentinels(args.max_sentinels)
        .sex_distribution(SexDistribution::from_male_share(args.male_proportion)?);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let config = builder.build().context("invalid pipeline settings")?;

    let (dataset, load_report) = load_dataset(&args.input, delimiter)
        .with_context(|| format!("failed to load {}", args.input))?;
    let mut rng = config.rng();
    let outcome = clean(dataset, &config, &mut rng)?;
    let counts = outcome.counts();

    write_dataset_csv(&args.output, outcome.cleaned(), delimiter)
        .with_context(|| format!("failed to write {}", args.output))?;
    info!("Cleaned rows written to {}", args.output);

    let run = build_run_report(&config, &outcome);
    write_json(&args.report, &run)
        .with_context(|| format!("failed to write {}", args.report))?;
    let report = &run.report;
    info!("Report written to {}", args.report);

    println!(
        "Rows read: {} ({} skipped, {} null dates)",
        format_int(load_report.total_rows),
        format_int(load_report.parse_errors),
        format_int(load_report.invalid_dates)
    );
    println!(
        "Imputed sex: {} | kept: {} | rejected (>{} markers): {}",
        format_int(counts.imputed),
        format_int(counts.filter.kept),
        config.max_sentinels,
        format_int(counts.filter.rejected)
    );
    println!(
        "Unique accidents: {} across {} districts",
        format_int(report.summary.unique_accidents),
        format_int(report.summary.districts)
    );

    let n = args.preview_rows;
    preview_table("Accidents per year", Some("deduplicated"), &report.accidents_by_year.rows(), n);
    preview_table("Persons per year", None, &report.persons_by_year.rows(), n);
    preview_table("Persons per accident type", None, &report.persons_by_accident_type.rows(), n);
    preview_table("Persons per weekday", None, &report.persons_by_weekday.rows(), n);
    preview_table("Persons per age bracket", None, &report.persons_by_age_bracket.rows(), n);
    preview_table(
        "Accidents per district",
        Some("deduplicated, most first"),
        &report.accidents_by_district.rows(),
        n,
    );

    let mut stats_rows = Vec::new();
    if let Some(stats) = &report.district_stats {
        stats_rows.push(stats.to_row("per district"));
    }
    for year in &report.yearly_district_stats {
        stats_rows.push(year.stats.to_row(&year.key));
    }
    preview_table(
        "Accidents per district: statistics",
        Some("sample std, linear quartiles"),
        &stats_rows,
        n,
    );

    Ok(())
}
