use std::{collections::BTreeMap, fs};

use chrono::{TimeZone, Utc};
use clap::Parser;
use tempfile::TempDir;

use helm_outdated::{
  Cli, Commands, Outdated,
  config::Settings,
  release::{Chart, Info, Metadata, Record, Status},
  repo::{ChartVersion, IndexFile, Repository, RepositoryFile, cache_file_name},
};

/// A Helm home on disk: `repositories.yaml` plus the cached index of every repository
pub struct HelmHome {
  // Keeps the directory alive for the duration of the test
  _dir: TempDir,
  pub settings: Settings,
}

/// Writes the repositories file and one index per repository, in the given order
///
/// Each repository lists the `(chart, version)` pairs it serves
pub fn helm_home(repositories: &[(&str, Vec<(&str, &str)>)]) -> HelmHome {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("repository");
  fs::create_dir(&cache).unwrap();

  let file = RepositoryFile {
    api_version: "v1".into(),
    repositories: repositories
      .iter()
      .map(|(name, _)| Repository {
        name: name.to_string(),
        url: format!("https://{name}.example.com/charts"),
      })
      .collect(),
  };
  let config = dir.path().join("repositories.yaml");
  fs::write(&config, serde_yaml::to_string(&file).unwrap()).unwrap();

  for (name, charts) in repositories {
    let mut entries: BTreeMap<String, Vec<ChartVersion>> = BTreeMap::new();
    for (chart, version) in charts.iter() {
      entries.entry(chart.to_string()).or_default().push(ChartVersion {
        name: chart.to_string(),
        version: version.to_string(),
        app_version: format!("{version}-app"),
        created: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        ..Default::default()
      });
    }
    let index = IndexFile {
      api_version: "v1".into(),
      entries,
    };
    fs::write(cache.join(cache_file_name(name)), serde_yaml::to_string(&index).unwrap()).unwrap();
  }

  HelmHome {
    settings: Settings {
      repository_config: Some(config),
      repository_cache: Some(cache),
      ..Default::default()
    },
    _dir: dir,
  }
}

/// Creates a deployed release revision in the `default` namespace
pub fn record(name: &str, chart: &str, version: &str) -> Record {
  revision(name, "default", chart, version, 1, Status::Deployed)
}

/// Creates a release revision with full control over its listing metadata
pub fn revision(name: &str, namespace: &str, chart: &str, version: &str, revision: i32, status: Status) -> Record {
  Record {
    name: name.into(),
    namespace: namespace.into(),
    version: revision,
    info: Some(Info {
      status,
      last_deployed: Some(Utc.with_ymd_and_hms(2024, 1, 1, revision as u32, 0, 0).unwrap()),
    }),
    chart: Some(Chart {
      metadata: Some(Metadata {
        name: chart.into(),
        version: version.into(),
        app_version: format!("{version}-app"),
        deprecated: false,
      }),
    }),
  }
}

/// Parses `helm outdated` arguments
pub fn outdated(args: &[&str]) -> Outdated {
  let argv = ["helm-outdated", "outdated"].into_iter().chain(args.iter().copied());
  match Cli::try_parse_from(argv).unwrap().commands {
    Commands::Outdated(outdated) => outdated,
  }
}
