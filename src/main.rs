mod cli;
mod config;
mod error;
mod model;
mod output;
mod pipeline;
mod selector;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use config::LoadedConfig;
use output::RenderOptions;
use store::{AnyStore, Driver, KubeContext, KubeReleaseStore, MemoryReleaseStore, StorageKind};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = LoadedConfig::discover()?;
    init_tracing(&args.log_filter(&config.values))?;
    if let Some(source) = &config.source {
        debug!(%source, "loaded config file");
    }

    if args.all_namespaces && args.namespace.is_some() {
        warn!("both --all-namespaces and --namespace were provided, using all namespaces");
    }

    let env_driver = std::env::var("HELM_DRIVER").ok();
    let env_namespace = std::env::var("HELM_NAMESPACE").ok();
    let driver = args.driver(env_driver.as_deref(), &config.values)?;

    let (store, scope) = match driver {
        Driver::Memory => {
            let store = MemoryReleaseStore::from_env()?;
            debug!(releases = store.len(), "seeded memory driver");
            let scope = args.namespace_scope(env_namespace.as_deref(), None);
            (AnyStore::Memory(store), scope)
        }
        Driver::Secret | Driver::Configmap => {
            let kube = KubeContext::new(args.kube_context.clone()).await?;
            debug!(context = kube.context(), cluster = kube.cluster(), "using kube context");
            let scope =
                args.namespace_scope(env_namespace.as_deref(), Some(kube.default_namespace()));
            let kind = if driver == Driver::Secret {
                StorageKind::Secrets
            } else {
                StorageKind::ConfigMaps
            };
            (AnyStore::Kube(KubeReleaseStore::new(kube.client(), kind)), scope)
        }
    };

    let spec = args.query_spec(scope, &config.values);
    let format = args.output_format(&config.values);
    let options = RenderOptions {
        no_headers: args.no_headers,
    };

    let rows = pipeline::list_releases(&store, spec).await?;
    let mut stdout = std::io::stdout().lock();
    output::emit(&mut stdout, format, &rows, &options)?;
    Ok(())
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new(cli::DEFAULT_LOG_FILTER))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}
