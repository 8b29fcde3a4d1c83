use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{
  Api,
  api::ListParams,
  config::{Config, KubeConfigOptions},
};

use crate::{
  config::{Driver, Settings},
  error::Error,
  release::{self, Record},
};

/// Label Helm puts on every storage object holding a release revision
const OWNER_LABEL: &str = "owner=helm";
/// Data key holding the encoded release record
const RELEASE_KEY: &str = "release";

/// Trait abstracting the Helm release storage read by helm-outdated
pub trait ReleaseStore {
  /// Every stored release revision of a namespace, or of the whole cluster when `namespace` is `None`
  fn list_releases(&self, namespace: Option<&str>) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send;
}

/// Release storage backed by the Kubernetes API, reading Secrets or ConfigMaps per the Helm driver
pub struct KubeReleaseStore {
  client: kube::Client,
  driver: Driver,
}

impl KubeReleaseStore {
  pub async fn new(settings: &Settings) -> Result<Self> {
    let config = match &settings.kube_context {
      Some(context) => {
        let options = KubeConfigOptions {
          context: Some(context.to_owned()),
          ..Default::default()
        };
        Config::from_kubeconfig(&options).await.map_err(|e| e.to_string())
      }
      None => Config::infer().await.map_err(|e| e.to_string()),
    };

    let client = config.and_then(|config| kube::Client::try_from(config).map_err(|e| e.to_string()));
    match client {
      Ok(client) => Ok(Self {
        client,
        driver: settings.driver,
      }),
      Err(e) => Err(
        Error::Initialization(format!(
          "Unable to connect to cluster: {e}\n\n\
          Ensure kubeconfig file is present and the selected context is reachable."
        ))
        .into(),
      ),
    }
  }

  /// Namespace of the current kube context
  pub fn default_namespace(&self) -> &str {
    self.client.default_namespace()
  }

  fn api<K>(&self, namespace: Option<&str>) -> Api<K>
  where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    <K as kube::Resource>::DynamicType: Default,
  {
    match namespace {
      Some(namespace) => Api::namespaced(self.client.clone(), namespace),
      None => Api::all(self.client.clone()),
    }
  }
}

impl ReleaseStore for KubeReleaseStore {
  async fn list_releases(&self, namespace: Option<&str>) -> Result<Vec<Record>> {
    let params = ListParams::default().labels(OWNER_LABEL);
    let mut records = Vec::new();

    match self.driver {
      Driver::Secret => {
        let secrets = self
          .api::<Secret>(namespace)
          .list(&params)
          .await
          .context("Failed to list Helm release secrets")?;

        for secret in secrets.items {
          let name = secret.metadata.name.unwrap_or_default();
          if let Some(payload) = secret.data.as_ref().and_then(|data| data.get(RELEASE_KEY)) {
            records.push(release::decode(&payload.0).with_context(|| format!("Failed to decode release secret {name}"))?);
          }
        }
      }
      Driver::Configmap => {
        let configmaps = self
          .api::<ConfigMap>(namespace)
          .list(&params)
          .await
          .context("Failed to list Helm release configmaps")?;

        for configmap in configmaps.items {
          let name = configmap.metadata.name.unwrap_or_default();
          if let Some(payload) = configmap.data.as_ref().and_then(|data| data.get(RELEASE_KEY)) {
            records.push(
              release::decode(payload.as_bytes()).with_context(|| format!("Failed to decode release configmap {name}"))?,
            );
          }
        }
      }
    }

    Ok(records)
  }
}
