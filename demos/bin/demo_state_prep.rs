//! State Preparation Demo
//!
//! Compiles a kernel that prepares a real amplitude vector, measures every
//! qubit, and prints the OpenQASM 2.0 listing. With no arguments it prepares
//! `[1/√2, 1/√2, 0, 0]`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use qprep::{CompileConfig, Pipeline, logging};

#[derive(Parser, Debug)]
#[command(name = "demo-state-prep")]
#[command(about = "Lower a state-preparation kernel to OpenQASM 2.0")]
struct Args {
    /// Real amplitudes, comma separated (length must be a power of two)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_value = "0.7071067811865476,0.7071067811865476,0,0"
    )]
    amplitudes: Vec<f64>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Override the optimization level (0 or 1)
    #[arg(short = 'O', long)]
    level: Option<u8>,

    /// Override the kernel name
    #[arg(short, long)]
    kernel: Option<String>,

    /// Print the effective configuration before the listing
    #[arg(long)]
    show_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CompileConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CompileConfig::default(),
    };
    if let Some(level) = args.level {
        config.optimization_level = level;
    }
    if let Some(kernel) = args.kernel {
        config.kernel_name = kernel;
    }

    logging::init(&config.logging).context("initializing logging")?;

    if args.show_config {
        eprintln!("{}", config.to_yaml()?);
    }

    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    info!(amplitudes = args.amplitudes.len(), "compiling");

    let qasm = pipeline
        .compile_real(&args.amplitudes)
        .with_context(|| format!("compiling {:?}", args.amplitudes))?;
    print!("{qasm}");
    Ok(())
}
