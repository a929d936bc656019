use clap::Parser;
use psu_remote::cli::Cli;
use psu_remote::{logging, output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if let Err(e) = cli.run().await {
        output::print_error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
