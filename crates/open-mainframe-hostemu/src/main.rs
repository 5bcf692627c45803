//! hostemu: batch runner for EXECIO host commands.
//!
//! Reads one host command per line from a file (or stdin), executes each
//! against an in-memory variable pool and data queue, and reports the
//! return code of every command.

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use open_mainframe_hostemu::{HostEmuConfig, HostEmulator, MemoryServices};

/// Run EXECIO/HI/TE/TS host commands in batch.
#[derive(Parser)]
#[command(name = "hostemu", about = "EXECIO host-command emulator")]
struct Cli {
    /// File of host commands, one per line (default: stdin).
    commands: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that relative file names resolve against.
    #[arg(long = "base-dir")]
    base_dir: Option<PathBuf>,

    /// Preset a variable (format: NAME=VALUE).
    #[arg(long = "var")]
    vars: Vec<String>,

    /// Queue a line before the first command.
    #[arg(long = "queue")]
    queue: Vec<String>,

    /// Print a stem (e.g. `LINES.`) after the run.
    #[arg(long = "show")]
    show: Vec<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so RC lines on stdout stay machine-readable.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(max_rc) => ExitCode::from(u8::try_from(max_rc).unwrap_or(u8::MAX)),
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u32, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => HostEmuConfig::from_file(path)?,
        None => HostEmuConfig::default(),
    };
    if cli.base_dir.is_some() {
        config.base_dir = cli.base_dir.clone();
    }
    debug!(?config, "configuration loaded");

    let mut services = MemoryServices::new();
    for assignment in &cli.vars {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("invalid --var '{assignment}', expected NAME=VALUE"))?;
        services.set_var(name, value);
    }
    for line in &cli.queue {
        services.queue_line(line.as_str());
    }

    let input: Box<dyn BufRead> = match &cli.commands {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let host = HostEmulator::new(config);
    let mut max_rc = 0u32;
    for line in input.lines() {
        let line = line?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        let result = host.execute(command, &mut services);
        println!("RC({}) {command}", result.rc_string());
        max_rc = max_rc.max(result.rc);
    }
    host.close_all();

    for stem in &cli.show {
        for (i, value) in services.stem_values(stem).iter().enumerate() {
            println!("{stem}{} = {value}", i + 1);
        }
    }
    for line in services.queued() {
        println!("QUEUE: {line}");
    }
    if services.halted {
        println!("HALT requested");
    }

    Ok(max_rc)
}
