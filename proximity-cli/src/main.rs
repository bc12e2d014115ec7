//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    proximity_cli::init_logging();
    if let Err(err) = proximity_cli::run() {
        eprintln!("proximity: {err}");
        std::process::exit(1);
    }
}
