mod compare;
mod data;
mod runner;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use data::loader::load_log;
use runner::BuildKind;

#[derive(Parser, Debug)]
#[command(name = "poet-parity")]
#[command(
    author,
    version,
    about = "Check the fixed-point build of a POET-instrumented program against the floating-point one",
    long_about = None
)]
struct Args {
    /// Telemetry log written by each run of the program under test
    #[arg(long = "log-file", default_value = "/tmp/poet_log.txt")]
    log_file: PathBuf,

    /// Command line used to run the instrumented program
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let command = args.command.join(" ");
    println!("{command}");

    runner::rebuild(BuildKind::FixedPoint)?;
    runner::run(&command)?;
    let fixed_point = load_log(&args.log_file)?;

    runner::rebuild(BuildKind::FloatingPoint)?;
    runner::run(&command)?;
    let floating_point = load_log(&args.log_file)?;

    compare::diff_datasets(
        &fixed_point,
        &floating_point,
        compare::DEFAULT_DECIMAL,
        &mut std::io::stdout().lock(),
    )
}
