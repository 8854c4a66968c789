use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use macro_viz::pipeline::{self, RunOutcome};
use macro_viz::query::{DEFAULT_COUNTRIES, DEFAULT_YEARS};
use macro_viz::{CachedFetcher, Client, INDICATORS, Indicator, Observation, storage, viz};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "macro-viz",
    version,
    about = "World Bank indicator → chart + table + CSV export, without the window"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one query: print the table, write the CSV and optionally a chart.
    Load(LoadArgs),
    /// List the available indicators.
    Indicators,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// ISO3 country codes, comma-separated (e.g., DEU,BRA,USA)
    #[arg(short, long, default_value = DEFAULT_COUNTRIES)]
    countries: String,
    /// Indicator display name or code (see `macro-viz indicators`)
    #[arg(short, long, default_value = INDICATORS[0].code)]
    indicator: String,
    /// First year (inclusive)
    #[arg(long, default_value_t = DEFAULT_YEARS.start)]
    from: i32,
    /// Last year (inclusive)
    #[arg(long, default_value_t = DEFAULT_YEARS.end)]
    to: i32,
    /// Directory to write the CSV export into.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// API base URL.
    #[arg(long, default_value = macro_viz::api::DEFAULT_BASE_URL, hide = true)]
    base_url: String,
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn print_table(rows: &[Observation]) {
    let w_country = rows
        .iter()
        .map(|r| r.country.chars().count())
        .max()
        .unwrap_or(0)
        .max("country".len());
    let w_ind = rows
        .iter()
        .map(|r| r.indicator.len())
        .max()
        .unwrap_or(0)
        .max("indicator".len());
    println!(
        "{:<4}  {:<w_country$}  {:<w_ind$}  {:>4}  value",
        "iso3", "country", "indicator", "year"
    );
    for r in rows {
        println!(
            "{:<4}  {:<w_country$}  {:<w_ind$}  {:>4}  {}",
            r.iso3,
            r.country,
            r.indicator,
            r.year,
            fmt_value(r.value)
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Load(args) => cmd_load(args),
        Command::Indicators => {
            for i in &INDICATORS {
                println!("{:<16} {}", i.code, i.name);
            }
            Ok(())
        }
    }
}

fn cmd_load(args: LoadArgs) -> Result<()> {
    let indicator = Indicator::lookup(&args.indicator)?;
    let fetcher = CachedFetcher::new(Client::with_base_url(&args.base_url)?);

    let outcome = pipeline::run(&fetcher, &args.countries, indicator, args.from, args.to);
    for w in outcome.warnings() {
        eprintln!("warning: {}", w);
    }

    let ds = match outcome {
        RunOutcome::Rejected(e) => bail!("{}", e),
        RunOutcome::Empty { .. } => {
            bail!("No data returned. Try another indicator, country code, or year range.")
        }
        RunOutcome::Rendered(ds) => ds,
    };

    print_table(&ds.table);

    if let Some(dir) = args.out_dir.as_ref() {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(ds.export_file_name());
        storage::save_csv(&ds.table, &path)?;
        eprintln!("Saved {} rows to {}", ds.table.len(), path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let title = format!("{} ({})", indicator.name, indicator.code);
        viz::plot_lines(&ds.table, plot_path, args.width, args.height, &title)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    Ok(())
}
