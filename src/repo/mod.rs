mod file;
mod index;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use file::{Repository, RepositoryFile};
pub use index::{ChartVersion, IndexFile, cache_file_name};

use crate::error::Result;

/// A chart offered by a repository, as known from the repository's cached index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
  /// Searchable name, `<repo>/<chart>`
  pub name: String,
  pub repo: String,
  pub chart: String,
  pub version: String,
  pub app_version: String,
  pub deprecated: bool,
  pub created: Option<DateTime<Utc>>,
}

impl IndexEntry {
  pub fn new(repo: &str, chart: &str, version: &ChartVersion) -> Self {
    Self {
      name: format!("{repo}/{chart}"),
      repo: repo.to_owned(),
      chart: chart.to_owned(),
      version: version.version.to_owned(),
      app_version: version.app_version.to_owned(),
      deprecated: version.deprecated,
      created: version.created,
    }
  }
}

/// Merged, read-only view over every configured repository
///
/// Holds the newest version of each chart of each repository, in repository order
/// and then chart name order.
#[derive(Clone, Debug, Default)]
pub struct Index {
  entries: Vec<IndexEntry>,
  /// Lower-cased entry names, kept alongside `entries` for case-insensitive matching
  keys: Vec<String>,
}

impl Index {
  /// Build the index from the repositories file and the repository cache directory
  ///
  /// Repositories whose cached index is missing or corrupt are skipped with a warning
  pub fn load(repository_config: &Path, repository_cache: &Path) -> Result<Self> {
    let repositories = file::load(repository_config)?;

    let mut entries = Vec::new();
    for repository in &repositories.repositories {
      let path = repository_cache.join(cache_file_name(&repository.name));
      match IndexFile::load(&repository.name, &path) {
        Ok(index) => {
          tracing::debug!("Loaded index of repo {} from {}", repository.name, path.display());
          entries.extend(repo_entries(&repository.name, &index));
        }
        Err(err) => {
          tracing::warn!("{err}");
        }
      }
    }

    Ok(entries.into_iter().collect())
  }

  /// Every entry, in insertion order
  pub fn all(&self) -> &[IndexEntry] {
    &self.entries
  }

  /// Entries whose name ends with `name`, compared case-insensitively
  // Linear in the size of the index; precomputed name buckets would avoid the scan
  pub fn matching(&self, name: &str) -> Vec<&IndexEntry> {
    let name = name.to_lowercase();
    self
      .keys
      .iter()
      .zip(&self.entries)
      .filter(|(key, _)| key.ends_with(&name))
      .map(|(_, entry)| entry)
      .collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl FromIterator<IndexEntry> for Index {
  fn from_iter<T: IntoIterator<Item = IndexEntry>>(iter: T) -> Self {
    let entries: Vec<IndexEntry> = iter.into_iter().collect();
    let keys = entries.iter().map(|entry| entry.name.to_lowercase()).collect();

    Self { entries, keys }
  }
}

/// The newest version of every chart in a repository index
fn repo_entries<'a>(repo: &'a str, index: &'a IndexFile) -> impl Iterator<Item = IndexEntry> + 'a {
  index.entries.iter().filter_map(move |(chart, versions)| {
    IndexFile::latest(versions).map(|latest| IndexEntry::new(repo, chart, latest))
  })
}
