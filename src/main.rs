//! `wyncc` entry point (spec.md §6, "CLI").

mod cli;

fn main() {
    env_logger::init();
    std::process::exit(cli::run());
}
