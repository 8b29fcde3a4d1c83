pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod output;
pub mod release;
pub mod repo;
pub mod report;
pub mod search;
pub mod version;

use std::io::{self, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, Outdated};
use clients::{KubeReleaseStore, ReleaseStore};
use config::Settings;
use release::InstalledRelease;
use repo::Index;

/// Install the stderr log subscriber; `RUST_LOG` takes precedence over `debug`
pub fn init_tracing(debug: bool) {
  let level = if debug { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .without_time()
    .with_target(false)
    .init();
}

/// Report the releases of the cluster that have newer charts available
pub async fn outdated(args: &Outdated, settings: &Settings) -> Result<()> {
  let store = KubeReleaseStore::new(settings).await?;
  let namespace = match (args.all_namespaces, &settings.namespace) {
    (true, _) => None,
    (false, Some(namespace)) => Some(namespace.to_owned()),
    (false, None) => Some(store.default_namespace().to_owned()),
  };

  run(&store, namespace.as_deref(), args, settings, &mut io::stdout()).await
}

/// List releases from `store` and write the report to `out`
pub async fn run(
  store: &impl ReleaseStore,
  namespace: Option<&str>,
  args: &Outdated,
  settings: &Settings,
  out: &mut impl Write,
) -> Result<()> {
  let releases = release::list(store, namespace, &args.list_options()).await?;
  check(&releases, args, settings, out)
}

/// Check releases against the configured repositories and write the report to `out`
///
/// When checking a release fails, the rows of the releases before it are still written.
pub fn check(releases: &[InstalledRelease], args: &Outdated, settings: &Settings, out: &mut impl Write) -> Result<()> {
  let index = Index::load(&settings.repository_config()?, &settings.repository_cache()?)?;
  tracing::debug!("Searching {} releases in {} indexed charts", releases.len(), index.len());

  match report::aggregate(&index, releases, &args.options()) {
    Ok(report) => output::output(out, &report, args.output, args.short),
    Err(aborted) => {
      if !aborted.partial.outdated.is_empty() || !aborted.partial.duplicates.is_empty() {
        output::output(out, &aborted.partial, args.output, args.short)?;
      }
      Err(aborted.into())
    }
  }
}
