//! repohealth command line interface
//!
//! Runs the health regression pipeline over the built-in repository metrics
//! and prints predictions and error metrics. Every flag is optional; the
//! defaults reproduce the reference run.

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info};
use repohealth::core::{Result, WorkingSetStrategy};
use repohealth::pipeline::{self, PipelineConfig};
use repohealth::{Gamma, HealthDataset, KernelSpec};
use std::process;

#[derive(Parser)]
#[command(name = "repohealth")]
#[command(about = "Predict repository health with support vector regression")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Fraction of rows held out for testing
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    seed: u32,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Half-width of the epsilon-insensitive tube
    #[arg(short, long, default_value = "0.1")]
    epsilon: f64,

    /// Kernel function
    #[arg(long, default_value = "rbf")]
    kernel: CliKernel,

    /// RBF gamma: 'scale', 'auto' or a positive number
    #[arg(long, default_value = "scale")]
    gamma: Gamma,

    /// Solver stopping tolerance
    #[arg(long, default_value = "0.001")]
    tolerance: f64,

    /// Maximum solver iterations
    #[arg(short, long, default_value = "100000")]
    max_iterations: usize,

    /// Working set selection strategy
    #[arg(long, default_value = "second-order")]
    working_set_strategy: CliWorkingSetStrategy,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// Radial basis function
    #[value(name = "rbf")]
    Rbf,
    /// Plain dot product
    #[value(name = "linear")]
    Linear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliWorkingSetStrategy {
    /// Second-order gain for the partner variable (default)
    #[value(name = "second-order")]
    SecondOrder,
    /// Maximal violating pair, first-order only
    #[value(name = "max-violating-pair")]
    MaxViolatingPair,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum OutputFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl From<CliWorkingSetStrategy> for WorkingSetStrategy {
    fn from(cli_strategy: CliWorkingSetStrategy) -> Self {
        match cli_strategy {
            CliWorkingSetStrategy::SecondOrder => WorkingSetStrategy::SecondOrder,
            CliWorkingSetStrategy::MaxViolatingPair => WorkingSetStrategy::MaximalViolatingPair,
        }
    }
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let kernel = match self.kernel {
            CliKernel::Rbf => KernelSpec::Rbf(self.gamma),
            CliKernel::Linear => KernelSpec::Linear,
        };

        PipelineConfig {
            test_size: self.test_size,
            seed: self.seed,
            c: self.c,
            epsilon: self.epsilon,
            kernel,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            working_set_strategy: self.working_set_strategy.into(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(&cli) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.pipeline_config();
    info!("Running health regression with {config:?}");

    let report = pipeline::run(&HealthDataset::embedded(), &config)?;

    match cli.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
