use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use imf_dots::{Client, ClientConfig, Counterparts, DotsQuery, Form, Frequency, PeriodBound, Variable};
use imf_dots::{
    CountryCode, DatabaseCode, DatabaseDimension, DatabaseInfo, IndicatorSeries, stats, storage, viz,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "imf",
    version,
    about = "Browse the IMF catalog and fetch Direction of Trade Statistics (imf)"
)]
struct Cli {
    /// Base URL of the SDMX-JSON service.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List country codes, or search them by name.
    Countries(SearchArgs),
    /// List databases, or search them by description.
    Databases(SearchArgs),
    /// Show metadata annotations of a database.
    Info {
        /// Database id (e.g. DOT)
        database_id: String,
    },
    /// Show the dimensions of a database.
    Dimensions {
        /// Database id (e.g. DOT)
        database_id: String,
    },
    /// Show the series codes of an indicator code list.
    Indicator {
        /// Code list id (e.g. CL_INDICATOR_DOT)
        indicator_id: String,
    },
    /// Fetch bilateral trade (and optionally save, plot, and print stats).
    Dots(DotsArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Case-insensitive keyword; lists everything when omitted.
    keyword: Option<String>,
    /// Treat the keyword as a regular expression.
    #[arg(long, default_value_t = false)]
    regex: bool,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct DotsArgs {
    /// Home country code (e.g. GR)
    #[arg(short, long)]
    country: String,
    /// Counterpart codes separated by comma or semicolon (e.g. US,AU,DE)
    #[arg(short = 'p', long)]
    counterparts: String,
    /// First period (year, or fractional year for monthly data)
    #[arg(short, long)]
    start: PeriodBound,
    /// Last period
    #[arg(short, long)]
    end: PeriodBound,
    /// A (annual) or M (monthly)
    #[arg(long, default_value = "A")]
    freq: Frequency,
    /// wide or long (wide only applies to several counterparts)
    #[arg(long, default_value = "wide")]
    form: Form,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a chart at the given path (.svg or .png). Needs long-form data.
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Measures to plot, separated by comma (default Exports,Imports,Trade Balance).
    #[arg(long)]
    subset: Option<String>,
    /// Chart title.
    #[arg(long)]
    title: Option<String>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 900).
    #[arg(long, default_value_t = 900)]
    height: u32,
    /// Locale for tick labels (en, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Print grouped statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn print_csv<T: Serialize>(header: &[&str], rows: &[T]) -> Result<()> {
    storage::write_csv(header, rows, io::stdout().lock())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ClientConfig::default();
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }
    let client = Client::new(config).context("build HTTP client")?;

    match cli.cmd {
        Command::Countries(args) => match args.keyword {
            Some(k) => print_csv(&CountryCode::COLUMNS, &client.country_search(&k, args.regex)?),
            None => print_csv(&CountryCode::COLUMNS, &client.country_codes()?),
        },
        Command::Databases(args) => match args.keyword {
            Some(k) => print_csv(&DatabaseCode::COLUMNS, &client.database_search(&k, args.regex)?),
            None => print_csv(&DatabaseCode::COLUMNS, &client.database_codes()?),
        },
        Command::Info { database_id } => print_csv(&DatabaseInfo::COLUMNS, &client.database_info(&database_id)?),
        Command::Dimensions { database_id } => {
            print_csv(&DatabaseDimension::COLUMNS, &client.database_dimensions(&database_id)?)
        }
        Command::Indicator { indicator_id } => {
            print_csv(&IndicatorSeries::COLUMNS, &client.indicator_dimensions(&indicator_id)?)
        }
        Command::Dots(args) => cmd_dots(&client, args),
    }
}

fn cmd_dots(client: &Client, args: DotsArgs) -> Result<()> {
    let mut list = parse_list(&args.counterparts);
    let counterparts = if list.len() == 1 {
        Counterparts::One(list.remove(0))
    } else {
        Counterparts::Many(list)
    };
    let subset: Vec<Variable> = match &args.subset {
        Some(s) => parse_list(s)
            .iter()
            .map(|v| v.parse::<Variable>())
            .collect::<Result<_, _>>()?,
        None => viz::DEFAULT_SUBSET.to_vec(),
    };

    let query = DotsQuery::new(args.country, counterparts, args.start, args.end)
        .freq(args.freq)
        .form(args.form);
    let table = client.dots(&query)?;

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&table, path)?,
            "json" => storage::save_json(&table, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", table.len(), path.display());
    } else {
        storage::write_table_csv(&table, io::stdout().lock())?;
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let opts = viz::PlotOptions {
            locale: args.locale.clone(),
            title: args.title.clone(),
            ..viz::PlotOptions::default()
        };
        viz::dots_plot_with(&table, &subset, plot_path, args.width, args.height, &opts)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    if args.stats {
        for s in stats::grouped_summary(&table) {
            println!(
                "{} • {}  count={}  min={} max={} mean={} median={}",
                s.key.counterpart,
                s.key.variable,
                s.count,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }

    Ok(())
}
