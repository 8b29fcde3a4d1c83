use std::{
  collections::{HashMap, hash_map::Entry},
  io::Read,
};

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::clients::ReleaseStore;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Lifecycle state of a release revision
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
  #[default]
  Unknown,
  Deployed,
  Uninstalled,
  Superseded,
  Failed,
  Uninstalling,
  PendingInstall,
  PendingUpgrade,
  PendingRollback,
}

/// A release revision as Helm stores it in the cluster
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Record {
  pub name: String,
  #[serde(default)]
  pub namespace: String,
  /// Revision number
  #[serde(default)]
  pub version: i32,
  #[serde(default)]
  pub info: Option<Info>,
  #[serde(default)]
  pub chart: Option<Chart>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Info {
  #[serde(default)]
  pub status: Status,
  #[serde(default)]
  pub last_deployed: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Chart {
  #[serde(default)]
  pub metadata: Option<Metadata>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
  pub name: String,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub app_version: String,
  #[serde(default)]
  pub deprecated: bool,
}

impl Record {
  fn status(&self) -> Status {
    self.info.as_ref().map(|info| info.status).unwrap_or_default()
  }

  fn last_deployed(&self) -> Option<DateTime<Utc>> {
    self.info.as_ref().and_then(|info| info.last_deployed)
  }
}

/// Decode the `release` payload of a Helm storage object
///
/// The payload is base64 text of the JSON record, gzip compressed unless written by a very old Helm.
pub fn decode(payload: &[u8]) -> Result<Record> {
  let raw = STANDARD
    .decode(payload.trim_ascii())
    .context("release payload is not valid base64")?;

  let json = if raw.starts_with(&GZIP_MAGIC) {
    let mut json = Vec::new();
    GzDecoder::new(raw.as_slice())
      .read_to_end(&mut json)
      .context("release payload is not valid gzip")?;
    json
  } else {
    raw
  };

  serde_json::from_slice(&json).context("release payload is not a valid release record")
}

/// A deployed release and the chart it was installed from
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstalledRelease {
  pub name: String,
  pub namespace: String,
  /// Chart name, without any repository prefix
  pub chart: String,
  /// Installed chart version
  pub version: String,
  pub app_version: String,
  pub revision: i32,
  pub status: Status,
  pub last_deployed: Option<DateTime<Utc>>,
}

impl From<Record> for InstalledRelease {
  fn from(record: Record) -> Self {
    let status = record.status();
    let last_deployed = record.last_deployed();
    let metadata = record.chart.and_then(|chart| chart.metadata).unwrap_or_default();

    Self {
      name: record.name,
      namespace: record.namespace,
      chart: metadata.name,
      version: metadata.version,
      app_version: metadata.app_version,
      revision: record.version,
      status,
      last_deployed,
    }
  }
}

/// Which releases to list and in what order, mirroring `helm list`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListOptions {
  pub by_date: bool,
  pub sort_reverse: bool,
  pub all: bool,
  pub uninstalled: bool,
  pub superseded: bool,
  pub uninstalling: bool,
  pub deployed: bool,
  pub failed: bool,
  pub pending: bool,
  /// Maximum number of releases, 0 for no limit
  pub limit: usize,
  pub offset: usize,
}

impl Default for ListOptions {
  fn default() -> Self {
    Self {
      by_date: false,
      sort_reverse: false,
      all: false,
      uninstalled: false,
      superseded: false,
      uninstalling: false,
      deployed: false,
      failed: false,
      pending: false,
      limit: 256,
      offset: 0,
    }
  }
}

impl ListOptions {
  /// States a release must be in to be listed; deployed and failed when no state is requested
  pub fn state_mask(&self) -> Vec<Status> {
    if self.all {
      return vec![
        Status::Unknown,
        Status::Deployed,
        Status::Uninstalled,
        Status::Superseded,
        Status::Failed,
        Status::Uninstalling,
        Status::PendingInstall,
        Status::PendingUpgrade,
        Status::PendingRollback,
      ];
    }

    let mut mask = Vec::new();
    if self.uninstalled {
      mask.push(Status::Uninstalled);
    }
    if self.superseded {
      mask.push(Status::Superseded);
    }
    if self.uninstalling {
      mask.push(Status::Uninstalling);
    }
    if self.deployed {
      mask.push(Status::Deployed);
    }
    if self.failed {
      mask.push(Status::Failed);
    }
    if self.pending {
      mask.extend([Status::PendingInstall, Status::PendingUpgrade, Status::PendingRollback]);
    }

    if mask.is_empty() {
      mask = vec![Status::Deployed, Status::Failed];
    }
    mask
  }

  /// Filter, sort and paginate stored release records
  pub fn apply(&self, records: Vec<Record>) -> Vec<InstalledRelease> {
    let mask = self.state_mask();

    // Every revision is listed only when superseded revisions are all that was asked for
    let records = if mask == [Status::Superseded] {
      records
    } else {
      latest_revisions(records)
    };

    let mut releases: Vec<InstalledRelease> = records
      .into_iter()
      .filter(|record| mask.contains(&record.status()))
      .map(InstalledRelease::from)
      .collect();

    if self.by_date {
      releases.sort_by(|a, b| {
        a.last_deployed
          .cmp(&b.last_deployed)
          .then_with(|| a.name.cmp(&b.name))
      });
    } else {
      releases.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.namespace.cmp(&b.namespace)));
    }
    if self.sort_reverse {
      releases.reverse();
    }

    let releases = releases.into_iter().skip(self.offset);
    match self.limit {
      0 => releases.collect(),
      limit => releases.take(limit).collect(),
    }
  }
}

/// Keep the highest revision of every release
fn latest_revisions(records: Vec<Record>) -> Vec<Record> {
  let mut latest: HashMap<(String, String), Record> = HashMap::new();

  for record in records {
    match latest.entry((record.namespace.to_owned(), record.name.to_owned())) {
      Entry::Occupied(mut current) => {
        if record.version > current.get().version {
          current.insert(record);
        }
      }
      Entry::Vacant(slot) => {
        slot.insert(record);
      }
    }
  }

  latest.into_values().collect()
}

/// List the installed releases of a namespace, or of every namespace when `namespace` is `None`
pub async fn list(
  store: &impl ReleaseStore,
  namespace: Option<&str>,
  options: &ListOptions,
) -> Result<Vec<InstalledRelease>> {
  let records = store.list_releases(namespace).await?;
  tracing::debug!("Found {} stored release revisions", records.len());

  Ok(options.apply(records))
}
