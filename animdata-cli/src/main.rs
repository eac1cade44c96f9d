//! d2animdata CLI Tool
//!
//! Command-line interface for compiling and decompiling AnimData.D2 files.

use animdata_core::{EncodeOptions, Record};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "d2animdata")]
#[command(about = "Read, write, and convert AnimData.D2 to JSON & tabbed TXT (and vice versa)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compiles JSON or tabbed text to AnimData.D2
    Compile {
        /// JSON or tabbed text file to compile
        source: PathBuf,

        /// AnimData.D2 file to save to
        animdata_d2: PathBuf,

        #[command(flatten)]
        format: FormatArgs,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Decompiles AnimData.D2 to JSON or tabbed text
    Decompile {
        /// AnimData.D2 file to decompile
        animdata_d2: PathBuf,

        /// JSON or tabbed text file to save to
        target: PathBuf,

        #[command(flatten)]
        format: FormatArgs,

        #[command(flatten)]
        records: RecordArgs,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FormatArgs {
    /// Use JSON
    #[arg(long)]
    json: bool,

    /// Use tabbed text (TXT)
    #[arg(long)]
    txt: bool,
}

#[derive(Args)]
struct RecordArgs {
    /// Sort the records alphabetically before saving
    #[arg(long)]
    sort: bool,

    /// Remove records with duplicate COF names, keeping the first one
    #[arg(long)]
    dedupe: bool,
}

#[derive(Debug, Clone, Copy)]
enum TextFormat {
    Json,
    Txt,
}

impl From<&FormatArgs> for TextFormat {
    fn from(args: &FormatArgs) -> Self {
        if args.txt {
            TextFormat::Txt
        } else {
            TextFormat::Json
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            source,
            animdata_d2,
            format,
            records,
        } => compile(&source, &animdata_d2, (&format).into(), &records)?,

        Commands::Decompile {
            animdata_d2,
            target,
            format,
            records,
        } => decompile(&animdata_d2, &target, (&format).into(), &records)?,
    }

    Ok(())
}

fn compile(source: &Path, animdata_d2: &Path, format: TextFormat, args: &RecordArgs) -> Result<()> {
    let file = File::open(source)
        .with_context(|| format!("Failed to open {}", source.display()))?;
    let reader = BufReader::new(file);
    let mut records = match format {
        TextFormat::Json => animdata_text::read_json(reader),
        TextFormat::Txt => animdata_text::read_txt(reader),
    }
    .with_context(|| format!("Failed to load records from {}", source.display()))?;

    check_records(&mut records, args);

    let file = File::create(animdata_d2)
        .with_context(|| format!("Failed to create {}", animdata_d2.display()))?;
    let mut writer = BufWriter::new(file);
    let options = EncodeOptions { sort: args.sort };
    animdata_core::write_to(&records, &mut writer, &options)
        .context("Failed to write AnimData.D2")?;
    writer.flush()?;

    log::info!(
        "Compiled {} record(s) to {}",
        records.len(),
        animdata_d2.display()
    );
    Ok(())
}

fn decompile(animdata_d2: &Path, target: &Path, format: TextFormat, args: &RecordArgs) -> Result<()> {
    let file = File::open(animdata_d2)
        .with_context(|| format!("Failed to open {}", animdata_d2.display()))?;
    let mut records = animdata_core::read_from(BufReader::new(file))
        .with_context(|| format!("Failed to read AnimData.D2 from {}", animdata_d2.display()))?;

    check_records(&mut records, args);
    if args.sort {
        animdata_core::sort_by_name(&mut records);
    }

    let file = File::create(target)
        .with_context(|| format!("Failed to create {}", target.display()))?;
    let mut writer = BufWriter::new(file);
    let written = match format {
        TextFormat::Json => animdata_text::write_json(&records, &mut writer),
        TextFormat::Txt => animdata_text::write_txt(&records, &mut writer),
    };
    written.with_context(|| format!("Failed to write records to {}", target.display()))?;
    writer.flush()?;

    log::info!(
        "Decompiled {} record(s) to {}",
        records.len(),
        target.display()
    );
    Ok(())
}

/// Warns about suspicious records, then applies --dedupe
fn check_records(records: &mut Vec<Record>, args: &RecordArgs) {
    animdata_core::find_duplicate_names(records);
    for record in records.iter() {
        animdata_core::check_trigger_bounds(record);
    }

    if args.dedupe {
        animdata_core::dedupe_by_name(records);
    }
}
