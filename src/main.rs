use clap::Parser;
use moexhist::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
