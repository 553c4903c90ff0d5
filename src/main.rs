use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::error;

use rusty_ts::data::{export, filter};
use rusty_ts::{load_file, load_split, Dataset, SplitRequest};

#[derive(Parser)]
#[command(name = "rusty-ts")]
#[command(about = "Inspect, validate and convert .ts time-series datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and shape of a dataset
    Info {
        file: PathBuf,
    },

    /// Validate a dataset; exits non-zero on the first error
    Check {
        file: PathBuf,
    },

    /// Convert a dataset to another format
    Convert {
        file: PathBuf,

        /// Output format
        #[arg(short = 't', long = "to", value_enum)]
        format: Format,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Keep only instances with these class labels
        #[arg(short, long)]
        label: Vec<String>,
    },

    /// Load the train/test pair of a problem and print both shapes
    Split {
        /// Directory holding one sub-directory per problem
        problem_path: PathBuf,

        /// Problem name
        dataset: String,

        /// Resample id
        #[arg(short, long)]
        resample: Option<u32>,

        /// Use the predefined `<dataset><resample>_TRAIN.ts` files
        #[arg(long)]
        predefined: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
    Parquet,
    Ts,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Info { file } => {
            let dataset = load_file(&file)?;
            print_info(&file.display().to_string(), &dataset);
        }
        Commands::Check { file } => {
            let dataset = load_file(&file)?;
            println!("{}: ok ({} instances)", file.display(), dataset.len());
        }
        Commands::Convert {
            file,
            format,
            output,
            label,
        } => {
            let mut dataset = load_file(&file)?;
            if !label.is_empty() {
                let known = filter::init_selection(&dataset);
                if known.is_empty() {
                    bail!("--label needs a classification dataset");
                }
                let selected: filter::LabelSelection = label.into_iter().collect();
                if let Some(unknown) = selected.difference(&known).next() {
                    bail!("unknown label '{unknown}'");
                }
                let indices = filter::filtered_indices(&dataset, &selected);
                if indices.is_empty() {
                    bail!("no instance matches the selected labels");
                }
                dataset = filter::subset(&dataset, &indices);
            }
            convert(&dataset, format, &output)?;
        }
        Commands::Split {
            problem_path,
            dataset,
            resample,
            predefined,
        } => {
            let mut request = SplitRequest::new(problem_path, dataset);
            if let Some(id) = resample {
                request = request.with_resample(id, predefined);
            }
            let split = load_split(&request)?;
            print_info("train", &split.train);
            print_info("test", &split.test);
            println!("resample needed: {}", split.resample);
        }
    }
    Ok(())
}

fn convert(dataset: &Dataset, format: Format, output: &Path) -> Result<()> {
    match format {
        Format::Json => export::to_json(dataset, output),
        Format::Csv => export::to_csv(dataset, output),
        Format::Parquet => export::to_parquet(dataset, output),
        Format::Ts => {
            std::fs::write(output, rusty_ts::write_ts(dataset))?;
            Ok(())
        }
    }
}

fn print_info(name: &str, dataset: &Dataset) {
    let m = &dataset.metadata;
    println!("{name}");
    println!("  problem:      {}", m.problem_name);
    println!("  instances:    {}", dataset.len());
    println!("  channels:     {}", dataset.n_channels());
    if let Some((lo, hi)) = dataset.series_length_range() {
        if lo == hi {
            println!("  length:       {lo}");
        } else {
            println!("  length:       {lo}..={hi}");
        }
    }
    println!("  missing:      {}", dataset.has_missing());
    println!("  timestamps:   {}", m.timestamps);
    match (dataset.target_kind(), &m.class_labels) {
        (Some(kind), Some(labels)) => {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            println!("  target:       {kind} ({})", labels.join(", "));
        }
        (Some(kind), None) => println!("  target:       {kind}"),
        (None, _) => println!("  target:       none"),
    }
}
