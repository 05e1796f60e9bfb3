//! Stockboard CLI — fetch, sort, filter, page, and export stock data.
//!
//! Commands:
//! - `show` — fetch stock data pages and print the formatted rows
//! - `columns` — print the column keys and labels of the stock data
//! - `aggregated` — fetch and print the aggregated stock exchange totals
//! - `export` — write a data source to a CSV file

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use stockboard_core::export::download_csv;
use stockboard_core::{
    CsvSource, DashboardConfig, DataSource, DisplayStockRecord, StockField, Store,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stockboard",
    about = "Stockboard CLI — sort, filter, and page stock market CSV data"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./stockboard.toml, then the
    /// user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stock data CSV path or URL (overrides the config).
    #[arg(long, global = true)]
    stock_data: Option<String>,

    /// Aggregated stock exchange CSV path or URL (overrides the config).
    #[arg(long, global = true)]
    aggregated: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct OrderingArgs {
    /// Column to sort by. Repeat to toggle: `--sort date --sort date` sorts descending.
    #[arg(long = "sort")]
    sort: Vec<String>,

    /// Only keep rows whose name matches exactly.
    #[arg(long)]
    filter: Option<String>,

    /// Page(s) to fetch, 1-indexed. Repeated pages accumulate in order.
    #[arg(long = "page", default_value = "1")]
    pages: Vec<u32>,
}

impl Default for OrderingArgs {
    fn default() -> Self {
        Self {
            sort: Vec::new(),
            filter: None,
            pages: vec![1],
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch stock data and print the formatted rows.
    Show {
        #[command(flatten)]
        ordering: OrderingArgs,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the stock data columns.
    Columns,
    /// Fetch and print the aggregated stock exchange totals.
    Aggregated {
        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write a data source to a CSV file.
    Export {
        /// Data source: stockData or aggregatedStockExchange.
        #[arg(long, default_value = "stockData")]
        source: DataSource,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        ordering: OrderingArgs,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(stock) = cli.stock_data {
        config.sources.stock_data = stock;
    }
    if let Some(agg) = cli.aggregated {
        config.sources.aggregated = agg;
    }

    match cli.command {
        Commands::Show { ordering, json } => run_show(&config, &ordering, json),
        Commands::Columns => run_columns(&config),
        Commands::Aggregated { json } => run_aggregated(&config, json),
        Commands::Export {
            source,
            out,
            ordering,
        } => run_export(&config, source, &ordering, &out),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config`, else `./stockboard.toml`, else `<config dir>/stockboard/config.toml`,
/// else built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<DashboardConfig> {
    if let Some(path) = explicit {
        return DashboardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let candidates = [
        Some(PathBuf::from("stockboard.toml")),
        dirs::config_dir().map(|d| d.join("stockboard").join("config.toml")),
    ];
    for path in candidates.into_iter().flatten() {
        if path.is_file() {
            debug!(path = %path.display(), "using config file");
            return DashboardConfig::from_file(&path)
                .with_context(|| format!("loading config {}", path.display()));
        }
    }
    Ok(DashboardConfig::default())
}

/// Apply sort/filter args, then fetch each requested page into the store.
fn fetch_stock_pages(store: &mut Store, source: &CsvSource, args: &OrderingArgs) -> Result<()> {
    for key in &args.sort {
        store.set_column_sort(DataSource::StockData, key)?;
    }
    store.set_filter_value(DataSource::StockData, args.filter.as_deref())?;

    for &page in &args.pages {
        store.set_data_page(DataSource::StockData, page)?;
        store
            .fetch_stock_data(source)
            .with_context(|| format!("fetching stock data page {page} from {source}"))?;
    }
    Ok(())
}

fn run_show(config: &DashboardConfig, args: &OrderingArgs, json: bool) -> Result<()> {
    let mut store = Store::from_config(config);
    fetch_stock_pages(&mut store, &config.stock_source(), args)?;

    let fmt = config.formatter();
    let rows = store.stock_data_formatted(&fmt);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let sort = store.stock_data_sort();
    println!(
        "{} rows (sorted by {} {})",
        rows.len(),
        sort.key,
        sort.order.as_str()
    );
    print_stock_table(&store, &rows);
    Ok(())
}

fn run_columns(config: &DashboardConfig) -> Result<()> {
    let mut store = Store::from_config(config);
    fetch_stock_pages(&mut store, &config.stock_source(), &OrderingArgs::default())?;

    for column in store.stock_data_columns() {
        println!("{:<12} {}", column.key, column.label);
    }
    Ok(())
}

fn run_aggregated(config: &DashboardConfig, json: bool) -> Result<()> {
    let mut store = Store::from_config(config);
    let source = config.aggregated_source();
    store
        .fetch_aggregated_stock_exchange(&source)
        .with_context(|| format!("fetching aggregated data from {source}"))?;

    let fmt = config.formatter();
    let rows = store.aggregated_data_formatted(&fmt);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<12} {:>20} {:>16}", "Date", "Total Rev", "Total Vol");
    for row in &rows {
        println!(
            "{:<12} {:>20} {:>16}",
            row.date,
            fmt.format_number(row.total_rev, true),
            fmt.format_number(row.total_vol, false)
        );
    }
    Ok(())
}

fn run_export(
    config: &DashboardConfig,
    source: DataSource,
    args: &OrderingArgs,
    out: &Path,
) -> Result<()> {
    let mut store = Store::from_config(config);
    match source {
        DataSource::StockData => {
            fetch_stock_pages(&mut store, &config.stock_source(), args)?;
        }
        DataSource::AggregatedStockExchange => {
            store.fetch_aggregated_stock_exchange(&config.aggregated_source())?;
        }
    }

    let records = store.data_records(source, &config.formatter());
    download_csv(&records, out)?;
    println!("Exported {} {source} rows to {}", records.len(), out.display());
    Ok(())
}

fn print_stock_table(store: &Store, rows: &[DisplayStockRecord]) {
    let columns = store.stock_data_columns();
    if columns.is_empty() {
        println!("(no rows)");
        return;
    }

    let fields: Vec<StockField> = columns
        .iter()
        .filter_map(|c| StockField::from_key(&c.key))
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .zip(&columns)
        .map(|(&field, column)| {
            rows.iter()
                .map(|r| r.get(field).chars().count())
                .chain(std::iter::once(column.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:<w$}", c.label))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));

    for row in rows {
        let cells: Vec<String> = fields
            .iter()
            .zip(&widths)
            .map(|(&field, &w)| format!("{:<w$}", row.get(field)))
            .collect();
        println!("{}", cells.join("  "));
    }
}
