use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The `repositories.yaml` file Helm maintains through `helm repo add`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFile {
  #[serde(default)]
  pub api_version: String,
  #[serde(default)]
  pub repositories: Vec<Repository>,
}

/// A configured chart repository
///
/// Credentials and TLS settings are ignored; only the locally cached index is read
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Repository {
  pub name: String,
  #[serde(default)]
  pub url: String,
}

/// Load the repositories file, failing if it is missing or lists no repository
pub fn load(path: &Path) -> Result<RepositoryFile> {
  let contents = match fs::read_to_string(path) {
    Ok(contents) => contents,
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      return Err(Error::NoRepositoryConfigured { path: path.to_owned() });
    }
    Err(err) => {
      return Err(Error::Initialization(format!(
        "failed to read repositories file {}: {err}",
        path.display()
      )));
    }
  };

  if contents.trim().is_empty() {
    return Err(Error::NoRepositoryConfigured { path: path.to_owned() });
  }

  let file: RepositoryFile = serde_yaml::from_str(&contents).map_err(|err| {
    Error::Initialization(format!("failed to parse repositories file {}: {err}", path.display()))
  })?;

  if file.repositories.is_empty() {
    return Err(Error::NoRepositoryConfigured { path: path.to_owned() });
  }

  Ok(file)
}
