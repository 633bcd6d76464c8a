use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;
use mmlseq::sequencer::FrameMapJson;
use mmlseq::{FrameMap, SynthConfig};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mmlseq")]
#[command(version = "0.1.0")]
#[command(about = "MML to synthesizer sequencer frame compiler", long_about = None)]
struct Args {
    /// Output JSON file (writes to stdout if not specified)
    output: Option<PathBuf>,

    /// Input MML file (reads from stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Engine configuration JSON file (sample_rate, time_units)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Synthesizer sample rate in Hz (overrides the config file)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Envelope time-units per note (overrides the config file)
    #[arg(long)]
    time_units: Option<u32>,

    /// Gzip the output (implied by a .gz extension)
    #[arg(short = 'z', long)]
    gzip: bool,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,

    /// Print per-channel statistics instead of JSON
    #[arg(long)]
    stats: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mmlseq: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn run(args: &Args) -> mmlseq::error::Result<()> {
    let mut config = match &args.config {
        Some(path) => SynthConfig::from_reader(File::open(path)?)?,
        None => SynthConfig::default(),
    };
    if let Some(sample_rate) = args.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(time_units) = args.time_units {
        config.time_units = time_units;
    }
    let mut compiler = mmlseq::Compiler::with_config(config)?;

    let map = match &args.input {
        Some(path) => compiler.compile_file(path)?,
        None => compiler.compile_reader(io::stdin())?,
    };

    if args.stats {
        print_stats(&map);
        return Ok(());
    }

    let json = FrameMapJson::new(&map);
    let text = if args.compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };

    match &args.output {
        Some(path) => {
            let gzip = args.gzip
                || path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("gz"))
                    .unwrap_or(false);
            let file = File::create(path)?;
            if gzip {
                let mut encoder = GzEncoder::new(file, Compression::default());
                encoder.write_all(text.as_bytes())?;
                encoder.write_all(b"\n")?;
                encoder.finish()?;
            } else {
                let mut file = file;
                file.write_all(text.as_bytes())?;
                file.write_all(b"\n")?;
            }
        }
        None => {
            println!("{}", text);
        }
    }

    Ok(())
}

fn print_stats(map: &FrameMap) {
    println!("|  ch  |  frames  |  seconds  |  samples  |");
    for (index, list) in map.iter().enumerate() {
        let summary = list.summary();
        println!(
            "|  {:>2}  |  {:>6}  |  {:>7.3}  |  {:>7}  |",
            index,
            list.len(),
            summary.elapsed_seconds,
            summary.elapsed_samples
        );
    }
}
