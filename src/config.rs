use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

const REPOSITORY_CONFIG_FILE: &str = "repositories.yaml";
const REPOSITORY_CACHE_DIR: &str = "repository";

/// Storage backend Helm keeps release records in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Driver {
  /// Kubernetes Secrets (Helm's default)
  #[default]
  #[value(alias = "secrets")]
  Secret,
  /// Kubernetes ConfigMaps
  #[value(alias = "configmaps")]
  Configmap,
}

/// Helm environment settings
///
/// Helm hands its global flags to plugins through `HELM_*` environment variables; each one
/// can also be given as a flag when the binary is run on its own.
#[derive(Args, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
  /// Namespace to list releases in, defaults to the namespace of the current kube context
  #[arg(short, long, global = true, env = "HELM_NAMESPACE")]
  pub namespace: Option<String>,

  /// Name of the kubeconfig context to use
  #[arg(long, global = true, env = "HELM_KUBECONTEXT")]
  pub kube_context: Option<String>,

  /// Path to the file containing repository names and URLs
  #[arg(long, global = true, env = "HELM_REPOSITORY_CONFIG")]
  pub repository_config: Option<PathBuf>,

  /// Path to the directory containing cached repository indexes
  #[arg(long, global = true, env = "HELM_REPOSITORY_CACHE")]
  pub repository_cache: Option<PathBuf>,

  #[arg(long, global = true, env = "HELM_CONFIG_HOME", hide = true)]
  pub config_home: Option<PathBuf>,

  #[arg(long, global = true, env = "HELM_CACHE_HOME", hide = true)]
  pub cache_home: Option<PathBuf>,

  /// Storage driver Helm keeps releases in
  #[arg(long, global = true, env = "HELM_DRIVER", value_enum, default_value_t)]
  pub driver: Driver,

  /// Enable verbose output
  #[arg(long, global = true, env = "HELM_DEBUG")]
  pub debug: bool,
}

impl Settings {
  /// Location of `repositories.yaml`
  pub fn repository_config(&self) -> Result<PathBuf> {
    resolve(
      self.repository_config.as_deref(),
      helm_home(self.config_home.as_deref(), dirs::preference_dir()),
      REPOSITORY_CONFIG_FILE,
    )
    .context("Unable to determine the Helm configuration directory; set HELM_REPOSITORY_CONFIG")
  }

  /// Directory holding the cached `<repo>-index.yaml` files
  pub fn repository_cache(&self) -> Result<PathBuf> {
    resolve(
      self.repository_cache.as_deref(),
      helm_home(self.cache_home.as_deref(), dirs::cache_dir()),
      REPOSITORY_CACHE_DIR,
    )
    .context("Unable to determine the Helm cache directory; set HELM_REPOSITORY_CACHE")
  }
}

/// Helm's home for a kind of data: the explicit override, or `<platform dir>/helm`
fn helm_home(explicit: Option<&Path>, platform_dir: Option<PathBuf>) -> Option<PathBuf> {
  explicit
    .map(Path::to_path_buf)
    .or_else(|| platform_dir.map(|dir| dir.join("helm")))
}

fn resolve(explicit: Option<&Path>, home: Option<PathBuf>, name: &str) -> Option<PathBuf> {
  explicit.map(Path::to_path_buf).or_else(|| home.map(|home| home.join(name)))
}
