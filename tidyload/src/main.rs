//! tidyload CLI - Load tagged CSV families and reshape them into tidy tables
//!
//! # Main Commands
//!
//! ```bash
//! tidyload load data/chinese-import- --tag-start 2     # Tag + concatenate
//! tidyload melt wide.csv --id Type --value-name Volume  # Wide to long
//! tidyload run recipes/import-dynamics.json             # Run a recipe
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! tidyload tag chinese-import-asia.csv --tag-start 2   # Show a file tag
//! tidyload group-sum long.csv --by Year --value Volume
//! tidyload filter table.csv --column YEAR --contains "Developed economies:"
//! tidyload steps                                        # Show recipe steps
//! tidyload example-recipe                               # Show example recipe
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tidyload::{
    error::PipelineResult, example_recipe, file_tag, filter_contains, group_sum, load_table,
    load_tagged, logs::RUN_LOG, melt_with, run_recipe, steps_description, LoadOptions, MeltSpec,
    Recipe, TidyTable,
};

#[derive(Parser)]
#[command(name = "tidyload")]
#[command(about = "Load tagged CSV families and reshape them into tidy tables", long_about = None)]
struct Cli {
    /// Write the run log as JSON to this file
    #[arg(long, global = true)]
    log_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tag derived from a file name
    Tag {
        /// File name (directory and extension are ignored)
        filename: String,

        /// Number of leading segments to drop
        #[arg(short, long)]
        tag_start: usize,

        /// Segment delimiter
        #[arg(short, long, default_value = "-")]
        delimiter: String,
    },

    /// Load every CSV starting with a path prefix, tagged by file name
    Load {
        /// Path prefix, e.g. data/chinese-import-
        pattern: String,

        /// Number of leading file-name segments dropped from the tag
        #[arg(short, long)]
        tag_start: usize,

        /// File-name segment delimiter
        #[arg(short, long, default_value = "-")]
        delimiter: String,

        /// Non-data lines before each header row
        #[arg(long, default_value = "2")]
        header_skip: usize,

        /// CSV field delimiter (auto-detect if not specified)
        #[arg(long)]
        csv_delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Reshape a wide CSV into long form
    Melt {
        /// Input CSV file
        input: PathBuf,

        /// Identifier column (repeatable)
        #[arg(long = "id", required = true)]
        id_columns: Vec<String>,

        /// Column to melt (repeatable, default: all non-identifier columns)
        #[arg(long = "value-column")]
        value_columns: Vec<String>,

        #[arg(long, default_value = "Year")]
        axis_name: String,

        #[arg(long, default_value = "Value")]
        value_name: String,

        /// Non-data lines before the header row
        #[arg(long, default_value = "0")]
        header_skip: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Sum a value column per group
    GroupSum {
        /// Input CSV file
        input: PathBuf,

        /// Grouping column
        #[arg(long)]
        by: String,

        /// Numeric column to sum (missing/non-numeric count as 0)
        #[arg(long)]
        value: String,

        #[arg(long, default_value = "0")]
        header_skip: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Keep rows whose column contains a literal, case-sensitive substring
    Filter {
        /// Input CSV file
        input: PathBuf,

        #[arg(long)]
        column: String,

        #[arg(long)]
        contains: String,

        #[arg(long, default_value = "0")]
        header_skip: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Run a JSON recipe
    Run {
        /// Recipe file
        recipe: PathBuf,

        /// Output file for the final table (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Write chart data to this file
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Show available recipe steps
    Steps,

    /// Show example recipe
    ExampleRecipe,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result: PipelineResult<()> = match cli.command {
        Commands::Tag { filename, tag_start, delimiter } => {
            println!("{}", file_tag(&filename, tag_start, &delimiter));
            Ok(())
        }

        Commands::Load {
            pattern,
            tag_start,
            delimiter,
            header_skip,
            csv_delimiter,
            output,
            format,
        } => {
            let options = LoadOptions::new(tag_start)
                .with_delimiter(delimiter)
                .with_header_skip(header_skip)
                .with_csv_delimiter(csv_delimiter);
            cmd_load(&pattern, &options, output.as_deref(), format)
        }

        Commands::Melt {
            input,
            id_columns,
            value_columns,
            axis_name,
            value_name,
            header_skip,
            output,
            format,
        } => {
            let mut spec = MeltSpec::new(id_columns)
                .with_axis_name(axis_name)
                .with_value_name(value_name);
            if !value_columns.is_empty() {
                spec = spec.with_value_columns(value_columns);
            }
            cmd_melt(&input, header_skip, &spec, output.as_deref(), format)
        }

        Commands::GroupSum { input, by, value, header_skip, output, format } => {
            cmd_group_sum(&input, header_skip, &by, &value, output.as_deref(), format)
        }

        Commands::Filter { input, column, contains, header_skip, output, format } => {
            cmd_filter(&input, header_skip, &column, &contains, output.as_deref(), format)
        }

        Commands::Run { recipe, output, format, chart } => {
            cmd_run(&recipe, output.as_deref(), format, chart.as_deref())
        }

        Commands::Steps => {
            println!("{}", steps_description());
            Ok(())
        }

        Commands::ExampleRecipe => example_recipe()
            .to_json()
            .map(|json| println!("{}", json))
            .map_err(Into::into),
    };

    if let Some(path) = cli.log_json.as_deref() {
        if let Err(e) = write_log(path) {
            eprintln!("Cannot write log: {}", e);
        }
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_load(
    pattern: &str,
    options: &LoadOptions,
    output: Option<&Path>,
    format: Format,
) -> PipelineResult<()> {
    let table = load_tagged(pattern, options)?;
    write_table(&table, output, format)
}

fn cmd_melt(
    input: &Path,
    header_skip: usize,
    spec: &MeltSpec,
    output: Option<&Path>,
    format: Format,
) -> PipelineResult<()> {
    let table = load_table(input, header_skip)?;
    let long = melt_with(&table, spec)?;
    log::info!("Melted {} rows into {}", table.len(), long.len());
    write_table(&long, output, format)
}

fn cmd_group_sum(
    input: &Path,
    header_skip: usize,
    by: &str,
    value: &str,
    output: Option<&Path>,
    format: Format,
) -> PipelineResult<()> {
    let table = load_table(input, header_skip)?;
    let summed = group_sum(&table, by, value)?;
    write_table(&summed, output, format)
}

fn cmd_filter(
    input: &Path,
    header_skip: usize,
    column: &str,
    needle: &str,
    output: Option<&Path>,
    format: Format,
) -> PipelineResult<()> {
    let table = load_table(input, header_skip)?;
    let subset = filter_contains(&table, column, needle)?;
    log::info!("Kept {} of {} rows", subset.len(), table.len());
    write_table(&subset, output, format)
}

fn cmd_run(
    recipe_path: &Path,
    output: Option<&Path>,
    format: Format,
    chart_path: Option<&Path>,
) -> PipelineResult<()> {
    let recipe = Recipe::from_file(recipe_path)?;
    let run = run_recipe(&recipe)?;

    for t in &run.trace {
        log::debug!("{:>2} {:<16} {} x {}", t.index, t.step, t.rows, t.columns);
    }

    if let Some(path) = chart_path {
        match &run.chart {
            Some(chart) => {
                fs::write(path, chart.to_json()?)?;
                log::info!("Chart data written to: {}", path.display());
            }
            None => log::warn!("Recipe declares no chart, nothing written to {}", path.display()),
        }
    }

    write_table(&run.table, output, format)
}

fn write_table(table: &TidyTable, path: Option<&Path>, format: Format) -> PipelineResult<()> {
    let mut buffer = Vec::new();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut buffer, &table.to_records())?;
            buffer.push(b'\n');
        }
        Format::Csv => table.write_csv(&mut buffer)?,
    }

    match path {
        Some(p) => {
            fs::write(p, &buffer)?;
            log::info!("Output written to: {}", p.display());
        }
        None => std::io::stdout().write_all(&buffer)?,
    }
    Ok(())
}

fn write_log(path: &Path) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(&RUN_LOG.entries())?;
    fs::write(path, json)?;
    Ok(())
}
