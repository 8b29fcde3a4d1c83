use anyhow::{Result, bail};

use helm_outdated::{clients::ReleaseStore, release::Record};

/// Mock release storage for testing
#[derive(Clone, Default)]
pub struct MockReleaseStore {
  pub records: Vec<Record>,
}

impl ReleaseStore for MockReleaseStore {
  async fn list_releases(&self, namespace: Option<&str>) -> Result<Vec<Record>> {
    Ok(
      self
        .records
        .iter()
        .filter(|record| namespace.is_none_or(|namespace| record.namespace == namespace))
        .cloned()
        .collect(),
    )
  }
}

/// Mock that fails every listing
pub struct MockReleaseStoreError;

impl ReleaseStore for MockReleaseStoreError {
  async fn list_releases(&self, _namespace: Option<&str>) -> Result<Vec<Record>> {
    bail!("mock storage error")
  }
}
