use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use compx_core::{
    numeric_value, CurrencyFormatter, RatioStudy, RatioStudyReport, Record, TrimFactor, DEFAULT_BIN_WIDTH,
    MAX_HISTOGRAM_BUCKETS,
};
use compx_similarity::{ComparablesRequest, ComparablesResponse};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Comparable-sales selection and ratio studies
#[derive(Parser, Debug)]
#[command(name = "compx")]
#[command(about = "Comparable-sales similarity and ratio-study engine", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank candidate sales against a subject property
    Comps {
        /// Request file (subject, candidates, fields, criteria); `-` reads stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Number of comparables to keep
        #[arg(short, long)]
        k: Option<usize>,

        /// Maximum distance from the subject in miles (0 disables)
        #[arg(long)]
        max_distance_miles: Option<f64>,

        /// Maximum living-area difference from the subject (0 disables)
        #[arg(long)]
        living_area_band: Option<f64>,

        /// Keep only candidates with the subject's land use
        #[arg(long)]
        same_land_use: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Candidate attribute shown as a currency column in table output
        #[arg(long)]
        price_key: Option<String>,
    },

    /// Trim, summarize and bin a collection of ratios
    RatioStudy {
        /// JSON array of ratios; `-` reads stdin
        #[arg(short, long)]
        input: PathBuf,

        /// IQR fence multiplier: none, 1.5 or 3
        #[arg(long, default_value = "none", value_parser = parse_trim)]
        trim: TrimArg,

        /// Histogram bucket width
        #[arg(long, default_value_t = DEFAULT_BIN_WIDTH, value_parser = parse_bin_width)]
        bin_width: f64,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

/// `--trim` value; `none` disables the fence
#[derive(Clone, Copy, Debug)]
struct TrimArg(Option<TrimFactor>);

fn parse_trim(s: &str) -> Result<TrimArg, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(TrimArg(None));
    }
    s.parse::<TrimFactor>().map(|t| TrimArg(Some(t)))
}

fn parse_bin_width(s: &str) -> Result<f64, String> {
    let width: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(format!("bin width must be a positive number, got {}", s))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("compx v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Comps {
            input,
            k,
            max_distance_miles,
            living_area_band,
            same_land_use,
            format,
            price_key,
        } => {
            let mut request = ComparablesRequest::from_json(&read_input(&input)?)
                .with_context(|| format!("Failed to parse comparables request {:?}", input))?;

            if let Some(k) = k {
                request.criteria.k = k;
            }
            if let Some(miles) = max_distance_miles {
                request.criteria.max_distance_miles = miles;
            }
            if let Some(band) = living_area_band {
                request.criteria.living_area_band = band;
            }
            if same_land_use {
                request.criteria.same_land_use = true;
            }

            let outcome = request.run().context("Comparable search failed")?;
            info!(
                candidates = outcome.candidates_count,
                filtered = outcome.filtered_count,
                results = outcome.comparables.len(),
                "Comparable search complete"
            );

            let response = outcome.into_response(true);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Table => print_comps_table(&response, price_key.as_deref()),
            }
        }
        Command::RatioStudy {
            input,
            trim,
            bin_width,
            format,
        } => {
            let raw: Value = serde_json::from_str(&read_input(&input)?)
                .with_context(|| format!("Failed to parse ratios {:?}", input))?;
            let ratios = ratio_values(&raw)?;

            let report = RatioStudy::new(trim.0, bin_width)
                .try_run(&ratios, MAX_HISTOGRAM_BUCKETS)
                .context("Ratio study failed")?;
            info!(
                input = report.input_count,
                trimmed = report.trimmed_count,
                buckets = report.histogram.len(),
                "Ratio study complete"
            );

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => print_ratio_table(&report),
            }
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }
}

/// Numeric entries of a JSON array; everything else is skipped
fn ratio_values(raw: &Value) -> anyhow::Result<Vec<f64>> {
    let entries = raw
        .as_array()
        .context("Ratios input must be a JSON array")?;
    let ratios: Vec<f64> = entries.iter().filter_map(numeric_value).collect();
    if ratios.len() < entries.len() {
        debug!(skipped = entries.len() - ratios.len(), "Skipped non-numeric ratio entries");
    }
    Ok(ratios)
}

fn print_comps_table(response: &ComparablesResponse<'_, Value>, price_key: Option<&str>) {
    let currency = CurrencyFormatter::default();

    print!("{:>4}  {:>6}  {:>10}  {:>8}", "rank", "index", "distance", "miles");
    if let Some(key) = price_key {
        print!("  {:>14}", key);
    }
    println!("  top field");

    for (rank, result) in response.result.iter().enumerate() {
        let miles = result
            .distance_miles
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string());
        print!("{:>4}  {:>6}  {:>10.6}  {:>8}", rank + 1, result.index, result.distance, miles);

        if let Some(key) = price_key {
            let price = result
                .item
                .and_then(|item| item.number(key))
                .map(|p| currency.format(p))
                .unwrap_or_else(|| "-".to_string());
            print!("  {:>14}", price);
        }

        println!("  {}", result.top_contributing_field.as_deref().unwrap_or("-"));
    }

    let stats = &response.stats;
    println!(
        "\n{} candidates, {} after filters, {} returned",
        stats.candidates_count, stats.filtered_count, stats.results_count
    );
}

fn print_ratio_table(report: &RatioStudyReport) {
    let trim = report
        .trim
        .map(|t| t.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!(
        "input: {}  trimmed: {}  trim: {}  bin width: {}",
        report.input_count, report.trimmed_count, trim, report.bin_width
    );

    match &report.summary {
        Some(s) => println!(
            "n: {}  median: {:.4}  average: {:.4}  min: {:.4}  max: {:.4}",
            s.n, s.median, s.average, s.min, s.max
        ),
        None => println!("no values retained"),
    }

    if report.histogram.is_empty() {
        return;
    }
    let peak = report.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    println!();
    for bucket in &report.histogram {
        let bar = "#".repeat(bucket.count * 40 / peak);
        println!("{:>10}  {:>6}  {}", bucket.bin_start, bucket.count, bar);
    }
}
