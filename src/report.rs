use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{
  error::Error,
  release::InstalledRelease,
  repo::{Index, IndexEntry},
  search::{self, MatchOutcome, Options},
};

/// A release together with a chart version offered by one repository
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
#[tabled(rename_all = "UpperCase")]
pub struct OutdatedElement {
  pub name: String,
  pub namespace: String,
  #[tabled(rename = "INSTALLED VERSION")]
  pub installed_version: String,
  #[tabled(rename = "LATEST VERSION")]
  pub latest_version: String,
  /// App version of the chart in the repository
  #[tabled(skip)]
  pub app_version: String,
  /// Chart identifier, `<repo>/<chart>`
  pub chart: String,
  /// When the chart version was published to the repository
  #[tabled(skip)]
  pub updated: Option<DateTime<Utc>>,
  #[tabled(skip)]
  pub deprecated: bool,
}

impl OutdatedElement {
  pub fn new(release: &InstalledRelease, entry: &IndexEntry) -> Self {
    Self {
      name: release.name.to_owned(),
      namespace: release.namespace.to_owned(),
      installed_version: release.version.to_owned(),
      latest_version: entry.version.to_owned(),
      app_version: entry.app_version.to_owned(),
      chart: entry.name.to_owned(),
      updated: entry.created,
      deprecated: entry.deprecated,
    }
  }

  /// Name of the repository serving the chart
  pub fn repository(&self) -> &str {
    self.chart.split('/').next().unwrap_or_default()
  }
}

/// A release whose chart is served by more than one repository
///
/// Which version is "the latest" depends on the repository the release is upgraded from,
/// so every serving repository is listed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepoDuplicateGroup {
  #[serde(rename = "deploy_name")]
  pub name: String,
  pub namespace: String,
  pub repos: Vec<OutdatedElement>,
}

/// Outdated releases and ambiguous releases, in release order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub outdated: Vec<OutdatedElement>,
  pub duplicates: Vec<RepoDuplicateGroup>,
  /// Releases skipped because no repository serves their chart
  #[serde(skip)]
  pub skipped: Vec<String>,
}

/// Checking a release failed; holds everything reported for the releases before it
#[derive(Debug, thiserror::Error)]
#[error("failed to check release '{release}'")]
pub struct Aborted {
  pub partial: Report,
  pub release: String,
  #[source]
  pub source: Error,
}

/// Search the index for every release and collect the results
///
/// Releases are searched in parallel and the results are folded back in release order.
/// A release no repository serves is skipped with a warning when `ignore_repo` is set and is
/// fatal otherwise; a version parse error is always fatal.
pub fn aggregate(index: &Index, releases: &[InstalledRelease], options: &Options) -> Result<Report, Aborted> {
  let outcomes: Vec<_> = releases
    .par_iter()
    .map(|release| search::search(index, release, options))
    .collect();

  let mut report = Report::default();
  for (release, outcome) in releases.iter().zip(outcomes) {
    let outcome = match outcome {
      Ok(outcome) => outcome,
      Err(source) => {
        return Err(Aborted {
          partial: report,
          release: release.name.to_owned(),
          source,
        });
      }
    };

    match outcome {
      MatchOutcome::SingleNewerFound(element) => report.outdated.push(element),
      MatchOutcome::MultipleReposFound(group) => report.duplicates.push(group),
      MatchOutcome::NoNewerFound => {}
      MatchOutcome::NoMatch if options.ignore_repo => {
        tracing::warn!("No repo was found which contains the chart '{}' (skipping)", release.chart);
        report.skipped.push(release.name.to_owned());
      }
      MatchOutcome::NoMatch => {
        return Err(Aborted {
          partial: report,
          release: release.name.to_owned(),
          source: Error::NoMatchingRepository {
            chart: release.chart.to_owned(),
          },
        });
      }
    }
  }

  Ok(report)
}
