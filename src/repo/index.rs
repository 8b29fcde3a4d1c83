use std::{cmp::Ordering, collections::BTreeMap, fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  version,
};

/// A cached repository index, `<cache>/<repo>-index.yaml`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
  #[serde(default)]
  pub api_version: String,
  /// Chart versions keyed by chart name
  #[serde(default)]
  pub entries: BTreeMap<String, Vec<ChartVersion>>,
}

/// The subset of a chart's metadata published in a repository index
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartVersion {
  #[serde(default)]
  pub name: String,
  pub version: String,
  #[serde(default)]
  pub app_version: String,
  #[serde(default)]
  pub deprecated: bool,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
}

/// File name Helm uses for the cached index of a repository
pub fn cache_file_name(repo: &str) -> String {
  format!("{repo}-index.yaml")
}

impl IndexFile {
  /// Load and parse a cached index file
  pub fn load(repo: &str, path: &Path) -> Result<Self> {
    let corrupt = |source: Box<dyn std::error::Error + Send + Sync>| Error::CorruptIndexFile {
      repo: repo.to_owned(),
      path: path.to_owned(),
      source,
    };

    let contents = fs::read_to_string(path).map_err(|err| corrupt(err.into()))?;
    let index: IndexFile = serde_yaml::from_str(&contents).map_err(|err| corrupt(err.into()))?;
    if index.api_version.is_empty() {
      return Err(corrupt("no API version specified".into()));
    }

    Ok(index)
  }

  /// The newest version of a chart
  ///
  /// Versions are ordered by semantic version; versions that cannot be parsed rank
  /// below every valid version. The first of equally ranked versions wins.
  pub fn latest<'a>(versions: &'a [ChartVersion]) -> Option<&'a ChartVersion> {
    let mut latest: Option<&ChartVersion> = None;

    for candidate in versions {
      let newer = match latest {
        None => true,
        Some(current) => compare(candidate, current) == Ordering::Greater,
      };
      if newer {
        latest = Some(candidate);
      }
    }

    latest
  }
}

fn compare(a: &ChartVersion, b: &ChartVersion) -> Ordering {
  match (version::parse(&a.version), version::parse(&b.version)) {
    (Ok(va), Ok(vb)) => version::precedence(&va, &vb),
    (Ok(_), Err(_)) => Ordering::Greater,
    (Err(_), Ok(_)) => Ordering::Less,
    (Err(_), Err(_)) => Ordering::Equal,
  }
}
