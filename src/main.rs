use std::process;

use clap::Parser;
use helm_outdated::{Cli, Commands};

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  helm_outdated::init_tracing(cli.settings.debug);

  let result = match &cli.commands {
    Commands::Outdated(args) => helm_outdated::outdated(args, &cli.settings).await,
  };

  if let Err(err) = result {
    eprintln!("ERROR: {err:#}");
    process::exit(1);
  }
}
