//! blockzip: parallel block compressor.
//!
//! Thin process boundary over `blockzip-core`: argument parsing, logger setup,
//! Ctrl-C handling and exit codes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info, LevelFilter};

use blockzip_core::compression::CompressionCodec;
use blockzip_core::config::{Mode, PipelineConfig};
use blockzip_core::stream::{prepare, InputSource, OutputSink};
use blockzip_core::types::PipelineError;
use blockzip_core::utils::parse_size;

const EXIT_FAULT: u8 = 1;
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "blockzip", version, about = "Parallel block compressor")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split SRC into blocks and write a compressed container to DST
    Compress(RunArgs),
    /// Restore the original bytes of container SRC into DST
    Decompress(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Source file
    src: PathBuf,
    /// Destination file
    dst: PathBuf,

    /// Block size, e.g. 65536, 256K, 1M
    #[arg(long, value_parser = parse_size)]
    block_size: Option<usize>,

    /// Transform worker threads (default: logical CPUs)
    #[arg(long)]
    workers: Option<usize>,

    /// Max in-flight blocks per queue
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// gzip, zlib, zstd or lz4; must match between compress and decompress
    #[arg(long)]
    codec: Option<CompressionCodec>,

    /// Codec level
    #[arg(long, allow_negative_numbers = true)]
    level: Option<i32>,

    /// Overwrite DST if it exists
    #[arg(short, long)]
    force: bool,

    /// JSON config file; command-line options override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print run telemetry as JSON on stdout
    #[arg(long)]
    stats: bool,
}

impl RunArgs {
    fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(size) = self.block_size {
            config.block_size = size;
        }
        if let Some(workers) = self.workers {
            config.profile.workers = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.profile.queue_capacity = capacity;
        }
        if let Some(codec) = self.codec {
            config.codec = codec;
        }
        if self.level.is_some() {
            config.level = self.level;
        }
        if self.force {
            config.overwrite = true;
        }
        Ok(config)
    }
}

fn init_logger(verbose: u8, log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose > 0 {
        builder.filter_level(match verbose {
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder.format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("installing logger")?;
    Ok(())
}

fn run(mode: Mode, args: RunArgs) -> Result<ExitCode> {
    let config = args.to_config()?;
    info!("{mode} {} -> {} ({config:?})", args.src.display(), args.dst.display());

    let prepared = match prepare(
        mode,
        InputSource::File(args.src.clone()),
        OutputSink::File(args.dst.clone()),
        &config,
    ) {
        Ok(p) => p,
        Err(e) => return Ok(report_failure(&e)),
    };

    let handle = prepared.cancel_handle();
    ctrlc::set_handler(move || handle.cancel()).context("installing Ctrl-C handler")?;

    match prepared.run() {
        Ok(report) => {
            if args.stats {
                println!("{}", serde_json::to_string_pretty(&report.telemetry)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(&e)),
    }
}

fn report_failure(err: &PipelineError) -> ExitCode {
    error!("{err}");
    eprintln!("blockzip: {err}");
    if err.is_cancelled() {
        ExitCode::from(EXIT_CANCELLED)
    } else {
        ExitCode::from(EXIT_FAULT)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logger(cli.verbose, cli.log_file.as_ref()) {
        eprintln!("blockzip: {e:#}");
        return ExitCode::from(EXIT_FAULT);
    }

    let result = match cli.command {
        Command::Compress(args) => run(Mode::Compress, args),
        Command::Decompress(args) => run(Mode::Decompress, args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("blockzip: {e:#}");
            ExitCode::from(EXIT_FAULT)
        }
    }
}
