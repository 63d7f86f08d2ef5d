use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use tracing::{debug, warn};

use super::codec::decode_payload;
use super::{ReleaseStore, narrow_to_mask};
use crate::error::{CodecError, StoreError};
use crate::model::{NamespaceScope, ReleaseRecord, StatusMask};

const OWNER_SELECTOR: &str = "owner=helm";
const RELEASE_KEY: &str = "release";

/// Resolved kubeconfig selection: the client plus the context's namespace.
#[derive(Clone)]
pub struct KubeContext {
    client: Client,
    context: String,
    cluster: String,
    default_namespace: String,
}

impl KubeContext {
    pub async fn new(context: Option<String>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().ok();

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if context.is_some() {
                anyhow::bail!("kubeconfig not found; --kube-context is unavailable in this environment");
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let cluster = config.cluster_url.to_string();
        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;

        let context = context
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());
        debug!(%context, %cluster, namespace = %default_namespace, "resolved kube context");

        Ok(Self {
            client,
            context,
            cluster,
            default_namespace,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

/// Which Kubernetes object kind carries the release records.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StorageKind {
    Secrets,
    ConfigMaps,
}

impl StorageKind {
    fn label(self) -> &'static str {
        match self {
            Self::Secrets => "secrets",
            Self::ConfigMaps => "configmaps",
        }
    }
}

pub struct KubeReleaseStore {
    client: Client,
    kind: StorageKind,
}

impl KubeReleaseStore {
    pub fn new(client: Client, kind: StorageKind) -> Self {
        Self { client, kind }
    }

    async fn list_secrets(
        &self,
        scope: &NamespaceScope,
        params: &ListParams,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        let secrets: Api<Secret> = scoped_api(self.client.clone(), scope);
        let list = secrets
            .list(params)
            .await
            .map_err(|source| self.kube_error(scope, source))?;

        Ok(list
            .into_iter()
            .filter_map(|secret| {
                let payload = secret
                    .data
                    .as_ref()
                    .and_then(|data| data.get(RELEASE_KEY))
                    .map(|bytes| bytes.0.as_slice());
                decode_object(&secret.name_any(), &secret.namespace().unwrap_or_default(), payload)
            })
            .collect())
    }

    async fn list_config_maps(
        &self,
        scope: &NamespaceScope,
        params: &ListParams,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        let config_maps: Api<ConfigMap> = scoped_api(self.client.clone(), scope);
        let list = config_maps
            .list(params)
            .await
            .map_err(|source| self.kube_error(scope, source))?;

        Ok(list
            .into_iter()
            .filter_map(|config_map| {
                let payload = config_map
                    .data
                    .as_ref()
                    .and_then(|data| data.get(RELEASE_KEY))
                    .map(String::as_bytes);
                decode_object(
                    &config_map.name_any(),
                    &config_map.namespace().unwrap_or_default(),
                    payload,
                )
            })
            .collect())
    }

    fn kube_error(&self, scope: &NamespaceScope, source: kube::Error) -> StoreError {
        StoreError::Kube {
            kind: self.kind.label(),
            scope: scope.label(),
            source,
        }
    }
}

impl ReleaseStore for KubeReleaseStore {
    async fn list(
        &self,
        scope: &NamespaceScope,
        mask: StatusMask,
        selector: Option<&str>,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        let labels = storage_selector(selector);
        debug!(kind = self.kind.label(), %scope, %labels, "listing release objects");
        let params = ListParams::default().labels(&labels);

        let records = match self.kind {
            StorageKind::Secrets => self.list_secrets(scope, &params).await?,
            StorageKind::ConfigMaps => self.list_config_maps(scope, &params).await?,
        };

        Ok(narrow_to_mask(records, mask))
    }
}

fn scoped_api<K>(client: Client, scope: &NamespaceScope) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    <K as kube::Resource>::DynamicType: Default,
{
    match scope {
        NamespaceScope::All => Api::all(client),
        NamespaceScope::Named(namespace) => Api::namespaced(client, namespace),
    }
}

/// Storage objects are always narrowed to Helm-owned ones; the caller's
/// selector is appended verbatim for the API server to evaluate.
fn storage_selector(selector: Option<&str>) -> String {
    match selector.map(str::trim).filter(|value| !value.is_empty()) {
        Some(selector) => format!("{OWNER_SELECTOR},{selector}"),
        None => OWNER_SELECTOR.to_string(),
    }
}

fn decode_object(name: &str, namespace: &str, payload: Option<&[u8]>) -> Option<ReleaseRecord> {
    let decoded = payload
        .ok_or(CodecError::MissingKey(RELEASE_KEY))
        .and_then(|payload| decode_payload(payload, namespace));

    match decoded {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(%error, object = name, namespace, "skipping undecodable release object");
            None
        }
    }
}
