use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the repository index and matching releases against it
#[derive(Debug, Error)]
pub enum Error {
  /// The cluster connection or the Helm settings could not be established
  #[error("Error while initializing: {0}")]
  Initialization(String),

  /// The repositories file is missing or does not list any repository
  #[error("no repositories configured in {}", path.display())]
  NoRepositoryConfigured { path: PathBuf },

  /// A single repository index could not be read or parsed
  #[error("Repo \"{repo}\" is corrupt or missing ({}). Try 'helm repo update'.", path.display())]
  CorruptIndexFile {
    repo: String,
    path: PathBuf,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// An installed or candidate version is not a semantic version
  #[error("invalid semantic version '{version}'")]
  VersionParse {
    version: String,
    #[source]
    source: semver::Error,
  },

  /// No configured repository serves a chart with a matching name
  #[error("Could not find any repo which contains {chart}")]
  NoMatchingRepository { chart: String },
}

pub type Result<T> = std::result::Result<T, Error>;
