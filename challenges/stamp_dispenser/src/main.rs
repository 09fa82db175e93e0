use std::io::BufReader;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::debug;

use stamp_dispenser::{StampDispenser, Scanner, Writer};

#[derive(Parser)]
#[command(name = "stamp_dispenser")]
#[command(about = "Minimum stamp counts for a postage machine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Machine {
    /// Stamp values, strictly descending and ending in 1
    #[arg(short, long, env = "STAMP_DENOMINATIONS", default_value = "90,30,24,10,6,2,1")]
    denominations: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the minimum number of stamps for each request
    Count {
        #[command(flatten)]
        machine: Machine,
        #[arg(allow_negative_numbers = true, required = true)]
        requests: Vec<i64>,
    },
    /// Print which stamps are handed out for each request
    Dispense {
        #[command(flatten)]
        machine: Machine,
        #[arg(allow_negative_numbers = true, required = true)]
        requests: Vec<i64>,
    },
    /// Read a machine and its requests from stdin
    Solve,
    /// Run a data suite from the data/ directory
    Verify {
        /// Suite name to run
        suite: String,
    },
}

fn load(machine: &Machine) -> Result<StampDispenser, ExitCode> {
    match machine.denominations.parse::<StampDispenser>() {
        Ok(dispenser) => {
            debug!("loaded denominations {:?}", dispenser.denominations());
            Ok(dispenser)
        }
        Err(err) => {
            eprintln!("error: {}", err);
            Err(ExitCode::from(2))
        }
    }
}

fn main() -> ExitCode {
    // install global collector configured based on RUST_LOG env var. Logs go to stderr so
    // stdout carries only results.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Count { machine, requests } => {
            let dispenser = match load(&machine) {
                Ok(dispenser) => dispenser,
                Err(code) => return code,
            };
            for request in requests {
                println!("{} -> {}", request, dispenser.min_units(request));
            }
        }
        Commands::Dispense { machine, requests } => {
            let dispenser = match load(&machine) {
                Ok(dispenser) => dispenser,
                Err(code) => return code,
            };
            for request in requests {
                match dispenser.dispense(request) {
                    Some(dispensed) => {
                        println!("{} = {} ({} stamps)", request, dispensed, dispensed.units)
                    }
                    None => println!("{}: invalid request", request),
                }
            }
        }
        Commands::Solve => {
            let mut scanner = Scanner::new(BufReader::new(std::io::stdin()));
            let mut writer = Writer::new();
            if let Err(err) = stamp_dispenser::solve(&mut scanner, &mut writer) {
                eprintln!("error: {}", err);
                return ExitCode::FAILURE;
            }
            match writer.into_string() {
                Ok(out) => print!("{}", out),
                Err(err) => {
                    eprintln!("error: {}", err);
                    return ExitCode::FAILURE;
                }
            }
        }
        Commands::Verify { suite } => {
            if !stamp_dispenser::testing::run_all_tests(&suite, stamp_dispenser::solve) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
