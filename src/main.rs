use clap::Parser;
use goaltree::cli::commands::Cli;
use goaltree::cli::handlers;
use goaltree::logging;

fn main() {
    let cli = Cli::parse();

    // A second subscriber can only come from tests; logging is best effort
    let _ = logging::init_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
