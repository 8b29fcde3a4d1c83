use crate::{
  error::Result,
  release::InstalledRelease,
  repo::Index,
  report::{OutdatedElement, RepoDuplicateGroup},
  version::{self, Constraint},
};

/// Settings that control how releases are matched and how unmatched releases are treated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
  /// Consider pre-release chart versions as candidates
  pub devel: bool,
  /// Report a single newer chart; when disabled, single matches are treated as up to date
  pub deprecation_notice: bool,
  /// Skip releases that no repository serves instead of failing
  pub ignore_repo: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      devel: false,
      deprecation_notice: true,
      ignore_repo: false,
    }
  }
}

/// Result of searching the index for a single release
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
  /// No repository serves a chart with a matching name
  NoMatch,
  /// Exactly one repository serves the chart, with a newer version
  SingleNewerFound(OutdatedElement),
  /// More than one repository serves a chart with a matching name
  MultipleReposFound(RepoDuplicateGroup),
  /// The only repository serving the chart has nothing newer
  NoNewerFound,
}

/// Search the index for charts matching the release's chart and classify the result
///
/// Every entry whose name ends with the chart name (case-insensitive) is a match.
/// A version that cannot be parsed fails the search for this release.
pub fn search(index: &Index, release: &InstalledRelease, options: &Options) -> Result<MatchOutcome> {
  let name = &release.chart;
  let chart_repos = index.matching(name);
  if chart_repos.is_empty() {
    tracing::debug!("Could not find any repo which contains {name}");
    return Ok(MatchOutcome::NoMatch);
  }

  let constraint = Constraint::newer_than(&release.version, options.devel)?;
  let mut found_newer = false;

  for entry in &chart_repos {
    let candidate = version::parse(&entry.version)?;

    tracing::debug!(
      "Comparing version of installed chart '{name}' => {} with version ({}) {} [constraint: '{constraint}']",
      release.version,
      entry.name,
      entry.version
    );
    if constraint.matches(&candidate) {
      tracing::debug!("Found newer version '{}' {} > {}", entry.name, entry.version, release.version);
      found_newer = true;
    }
  }

  match chart_repos.as_slice() {
    [entry] if options.deprecation_notice && found_newer => {
      Ok(MatchOutcome::SingleNewerFound(OutdatedElement::new(release, entry)))
    }
    [_] => {
      tracing::debug!("No newer chart was found for '{name}'");
      Ok(MatchOutcome::NoNewerFound)
    }
    entries => {
      tracing::debug!(
        "{} repositories serve the '{name}' chart, reporting all of them",
        entries.len()
      );
      Ok(MatchOutcome::MultipleReposFound(RepoDuplicateGroup {
        name: release.name.to_owned(),
        namespace: release.namespace.to_owned(),
        repos: entries.iter().map(|entry| OutdatedElement::new(release, entry)).collect(),
      }))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    error::Error,
    repo::{ChartVersion, IndexEntry},
  };

  fn entry(repo: &str, chart: &str, version: &str) -> IndexEntry {
    IndexEntry::new(
      repo,
      chart,
      &ChartVersion {
        name: chart.to_string(),
        version: version.to_string(),
        app_version: format!("app-{version}"),
        ..Default::default()
      },
    )
  }

  fn release(name: &str, chart: &str, version: &str) -> InstalledRelease {
    InstalledRelease {
      name: name.to_string(),
      namespace: "default".to_string(),
      chart: chart.to_string(),
      version: version.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn no_match() {
    let index: Index = vec![entry("repoA", "nginx", "1.0.0")].into_iter().collect();
    let outcome = search(&index, &release("x", "unknown-chart", "1.0.0"), &Options::default()).unwrap();
    assert_eq!(outcome, MatchOutcome::NoMatch);
  }

  #[test]
  fn single_newer() {
    let index: Index = vec![entry("repoA", "myapp", "1.3.0")].into_iter().collect();
    let outcome = search(&index, &release("myapp", "myapp", "1.2.0"), &Options::default()).unwrap();

    let MatchOutcome::SingleNewerFound(element) = outcome else {
      panic!("expected a single newer chart");
    };
    assert_eq!(element.name, "myapp");
    assert_eq!(element.namespace, "default");
    assert_eq!(element.installed_version, "1.2.0");
    assert_eq!(element.latest_version, "1.3.0");
    assert_eq!(element.app_version, "app-1.3.0");
    assert_eq!(element.chart, "repoA/myapp");
  }

  #[test]
  fn single_not_newer() {
    let index: Index = vec![entry("repoA", "myapp", "1.9.0")].into_iter().collect();
    let outcome = search(&index, &release("myapp", "myapp", "2.0.0"), &Options::default()).unwrap();
    assert_eq!(outcome, MatchOutcome::NoNewerFound);
  }

  #[test]
  fn single_newer_without_deprecation_notice() {
    let index: Index = vec![entry("repoA", "myapp", "1.3.0")].into_iter().collect();
    let options = Options {
      deprecation_notice: false,
      ..Default::default()
    };
    let outcome = search(&index, &release("myapp", "myapp", "1.2.0"), &options).unwrap();
    assert_eq!(outcome, MatchOutcome::NoNewerFound);
  }

  #[test]
  fn multiple_repos_report_every_entry_in_index_order() {
    let index: Index = vec![
      entry("repoA", "myapp", "1.3.0"),
      entry("repoC", "other", "9.9.9"),
      entry("repoB", "myapp", "1.1.0"),
    ]
    .into_iter()
    .collect();

    let outcome = search(&index, &release("prod-app", "myapp", "1.2.0"), &Options::default()).unwrap();
    let MatchOutcome::MultipleReposFound(group) = outcome else {
      panic!("expected multiple repositories");
    };
    assert_eq!(group.name, "prod-app");
    assert_eq!(group.namespace, "default");
    let charts: Vec<(&str, &str)> = group
      .repos
      .iter()
      .map(|e| (e.chart.as_str(), e.latest_version.as_str()))
      .collect();
    assert_eq!(charts, vec![("repoA/myapp", "1.3.0"), ("repoB/myapp", "1.1.0")]);
    assert!(group.repos.iter().all(|e| e.installed_version == "1.2.0"));
  }

  #[test]
  fn multiple_repos_reported_even_when_none_is_newer() {
    let index: Index = vec![entry("repoA", "myapp", "1.0.0"), entry("repoB", "myapp", "1.0.0")]
      .into_iter()
      .collect();

    let outcome = search(&index, &release("myapp", "myapp", "1.2.0"), &Options::default()).unwrap();
    assert!(matches!(outcome, MatchOutcome::MultipleReposFound(ref group) if group.repos.len() == 2));
  }

  #[test]
  fn devel_prerelease() {
    let index: Index = vec![entry("repoA", "myapp", "1.0.0-beta.2")].into_iter().collect();
    let options = Options {
      devel: true,
      ..Default::default()
    };

    let outcome = search(&index, &release("myapp", "myapp", "1.0.0-beta.1"), &options).unwrap();
    assert!(matches!(outcome, MatchOutcome::SingleNewerFound(ref e) if e.latest_version == "1.0.0-beta.2"));
  }

  #[test]
  fn prerelease_candidate_without_devel() {
    let index: Index = vec![entry("repoA", "myapp", "1.3.0-rc.1")].into_iter().collect();
    let outcome = search(&index, &release("myapp", "myapp", "1.2.0"), &Options::default()).unwrap();
    assert_eq!(outcome, MatchOutcome::NoNewerFound);
  }

  #[test]
  fn malformed_index_version_is_an_error() {
    let index: Index = vec![entry("repoA", "myapp", "latest")].into_iter().collect();
    let err = search(&index, &release("myapp", "myapp", "1.2.0"), &Options::default()).unwrap_err();
    assert!(matches!(err, Error::VersionParse { ref version, .. } if version == "latest"), "{err}");
  }

  #[test]
  fn malformed_installed_version_is_an_error() {
    let index: Index = vec![entry("repoA", "myapp", "1.0.0")].into_iter().collect();
    let err = search(&index, &release("myapp", "myapp", "garbage"), &Options::default()).unwrap_err();
    assert!(matches!(err, Error::VersionParse { .. }), "{err}");
  }

  #[test]
  fn malformed_installed_version_without_match_is_no_match() {
    let index: Index = vec![entry("repoA", "nginx", "1.0.0")].into_iter().collect();
    let outcome = search(&index, &release("x", "unknown-chart", "garbage"), &Options::default()).unwrap();
    assert_eq!(outcome, MatchOutcome::NoMatch);
  }

  #[test]
  fn search_is_idempotent() {
    let index: Index = vec![entry("repoA", "myapp", "1.3.0"), entry("repoB", "web", "2.0.0")]
      .into_iter()
      .collect();
    let release = release("myapp", "myapp", "1.2.0");

    let first = search(&index, &release, &Options::default()).unwrap();
    let second = search(&index, &release, &Options::default()).unwrap();
    assert_eq!(first, second);
  }
}
