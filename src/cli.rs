use clap::{ArgAction, Args, Parser, Subcommand, builder::Styles};
use serde::{Deserialize, Serialize};

use crate::{config::Settings, output, release::ListOptions, search};

#[derive(Parser, Debug)]
#[command(author, about, version, long_version = long_version())]
#[command(propagate_version = true, styles = styles())]
pub struct Cli {
  #[command(subcommand)]
  pub commands: Commands,

  #[clap(flatten)]
  pub settings: Settings,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  #[command(visible_alias = "od")]
  Outdated(Outdated),
}

/// List deployed releases that have newer charts available
///
/// Every release is looked up in the cached indexes of the configured repositories
/// (`helm repo update` refreshes them). Releases whose chart is served by more than one
/// repository are listed separately with every repository that serves it.
#[derive(Args, Debug, Serialize, Deserialize)]
pub struct Outdated {
  /// Report releases with a single newer chart; set to false to hide them
  #[arg(
    long,
    action = ArgAction::Set,
    num_args = 0..=1,
    require_equals = true,
    default_value_t = true,
    default_missing_value = "true"
  )]
  pub deprecation_notice: bool,

  /// Skip releases whose chart is not served by any repository instead of failing
  #[arg(long)]
  pub ignore_repo: bool,

  /// Use development versions (alpha, beta, and release candidates) too
  #[arg(long)]
  pub devel: bool,

  /// Output only the names of outdated releases
  #[arg(short = 'q', long)]
  pub short: bool,

  /// Sort by release date
  #[arg(short = 'd', long)]
  pub date: bool,

  /// Reverse the sort order
  #[arg(short, long)]
  pub reverse: bool,

  /// Show all releases regardless of state
  #[arg(short, long)]
  pub all: bool,

  /// Show uninstalled releases
  #[arg(long)]
  pub uninstalled: bool,

  /// Show superseded releases
  #[arg(long)]
  pub superseded: bool,

  /// Show releases that are currently being uninstalled
  #[arg(long)]
  pub uninstalling: bool,

  /// Show deployed releases; shown by default when no state is requested
  #[arg(long)]
  pub deployed: bool,

  /// Show failed releases
  #[arg(long)]
  pub failed: bool,

  /// Show pending releases
  #[arg(long)]
  pub pending: bool,

  /// List releases across all namespaces
  #[arg(short = 'A', long)]
  pub all_namespaces: bool,

  /// Maximum number of releases to fetch, 0 for no limit
  #[arg(short, long, default_value_t = 256)]
  pub max: usize,

  /// Next release index in the list, used to offset from start value
  #[arg(long, default_value_t = 0)]
  pub offset: usize,

  #[arg(short, long, value_enum, default_value_t)]
  pub output: output::Format,
}

impl Outdated {
  pub fn options(&self) -> search::Options {
    search::Options {
      devel: self.devel,
      deprecation_notice: self.deprecation_notice,
      ignore_repo: self.ignore_repo,
    }
  }

  pub fn list_options(&self) -> ListOptions {
    ListOptions {
      by_date: self.date,
      sort_reverse: self.reverse,
      all: self.all,
      uninstalled: self.uninstalled,
      superseded: self.superseded,
      uninstalling: self.uninstalling,
      deployed: self.deployed,
      failed: self.failed,
      pending: self.pending,
      limit: self.max,
      offset: self.offset,
    }
  }
}

fn long_version() -> String {
  match option_env!("GIT_COMMIT") {
    Some(commit) => format!("{} (commit {commit})", env!("CARGO_PKG_VERSION")),
    None => env!("CARGO_PKG_VERSION").to_owned(),
  }
}

fn styles() -> Styles {
  use anstyle::{AnsiColor, Effects};

  Styles::styled()
    .header(AnsiColor::Green.on_default() | Effects::BOLD)
    .usage(AnsiColor::Green.on_default() | Effects::BOLD)
    .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
    .placeholder(AnsiColor::Cyan.on_default())
}
