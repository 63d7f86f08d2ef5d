use anyhow::Result;
use clap::Parser;

use crate::config::FileConfig;
use crate::model::{NamespaceScope, QuerySpec, SortDirection, SortKey, StatusToggles};
use crate::output::OutputFormat;
use crate::store::Driver;

const LIST_HELP: &str = "\
Lists releases in a namespace (the current context's namespace when none is given).

By default only deployed and failed releases are shown. Status flags such as
--uninstalled and --all change this and can be combined: --uninstalled --failed.

Releases are sorted by name unless -d/--date is given. --filter takes a regular
expression; only releases whose name matches it are listed.

At most 256 releases are shown by default. --max 0 disables the cap at this layer;
pair --max with --offset to page through results.";

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "shortlist",
    version,
    about = "List Helm releases tracked in a Kubernetes cluster.",
    long_about = LIST_HELP
)]
pub struct CliArgs {
    /// List releases across all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Namespace to list (defaults to the kube context's namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// kubeconfig context to use
    #[arg(long)]
    pub kube_context: Option<String>,

    /// Release storage driver (falls back to HELM_DRIVER)
    #[arg(long, value_enum)]
    pub driver: Option<Driver>,

    /// Print tables without the header row
    #[arg(long)]
    pub no_headers: bool,

    /// strftime-style format for the UPDATED column, e.g. "%Y-%m-%d %H:%M:%S%z"
    #[arg(long)]
    pub time_format: Option<String>,

    /// Sort by release date
    #[arg(short = 'd', long = "date")]
    pub by_date: bool,

    /// Reverse the sort order
    #[arg(short, long)]
    pub reverse: bool,

    /// Show releases in every state
    #[arg(short, long)]
    pub all: bool,

    /// Show uninstalled releases (kept with --keep-history)
    #[arg(long)]
    pub uninstalled: bool,

    /// Show superseded releases
    #[arg(long)]
    pub superseded: bool,

    /// Show releases currently being uninstalled
    #[arg(long)]
    pub uninstalling: bool,

    /// Show deployed releases. Enabled automatically when no other state is given
    #[arg(long)]
    pub deployed: bool,

    /// Show failed releases
    #[arg(long)]
    pub failed: bool,

    /// Show pending releases
    #[arg(long)]
    pub pending: bool,

    /// Maximum number of releases to show [default: 256]
    #[arg(short = 'm', long = "max")]
    pub max: Option<usize>,

    /// Index of the first release to show
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Regular expression; only releases whose name matches are listed
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Label selector, supports '=', '==' and '!=' (e.g. -l key1=value1,key2!=value2)
    #[arg(short = 'l', long)]
    pub selector: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// tracing filter (for example: warn,debug,trace)
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl CliArgs {
    pub fn status_toggles(&self) -> StatusToggles {
        StatusToggles {
            all: self.all,
            deployed: self.deployed,
            failed: self.failed,
            pending: self.pending,
            uninstalled: self.uninstalled,
            uninstalling: self.uninstalling,
            superseded: self.superseded,
        }
    }

    pub fn query_spec(&self, scope: NamespaceScope, config: &FileConfig) -> QuerySpec {
        let mut spec = QuerySpec::new(scope);
        spec.mask = self.status_toggles().mask();
        spec.selector = non_blank(self.selector.as_deref());
        spec.filter = non_blank(self.filter.as_deref());
        if self.by_date {
            spec.sort_key = SortKey::Date;
        }
        if self.reverse {
            spec.direction = SortDirection::Descending;
        }
        spec.offset = self.offset;
        if let Some(limit) = self.max.or(config.max) {
            spec.limit = limit;
        }
        spec.time_format = non_blank(self.time_format.as_deref())
            .or_else(|| non_blank(config.time_format.as_deref()));
        spec
    }

    pub fn output_format(&self, config: &FileConfig) -> OutputFormat {
        self.output.or(config.output).unwrap_or_default()
    }

    /// Flag, then `HELM_DRIVER`, then config file.
    pub fn driver(&self, env_driver: Option<&str>, config: &FileConfig) -> Result<Driver> {
        if let Some(driver) = self.driver {
            return Ok(driver);
        }
        if let Some(raw) = env_driver {
            return Driver::from_token(raw)
                .ok_or_else(|| anyhow::anyhow!("unknown HELM_DRIVER value '{raw}'"));
        }
        Ok(config.driver.unwrap_or_default())
    }

    pub fn log_filter(&self, config: &FileConfig) -> String {
        self.log_filter
            .clone()
            .or_else(|| config.log_filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// `--all-namespaces` wins, then `--namespace`, `HELM_NAMESPACE`, the kube
    /// context's namespace and finally `default`.
    pub fn namespace_scope(
        &self,
        env_namespace: Option<&str>,
        context_namespace: Option<&str>,
    ) -> NamespaceScope {
        if self.all_namespaces {
            return NamespaceScope::All;
        }

        let namespace = non_blank(self.namespace.as_deref())
            .or_else(|| non_blank(env_namespace))
            .or_else(|| non_blank(context_namespace))
            .unwrap_or_else(|| "default".to_string());
        NamespaceScope::Named(namespace)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
