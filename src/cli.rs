use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use cistab::auth::Credentials;
use cistab::collect::{collect, CollectSettings};
use cistab::config::{resolve_descriptors, CiManagement, LookbackWindow, DEFAULT_LOOKBACK_DAYS};
use cistab::descriptor::{CiSourceDescriptor, DEFAULT_SYSTEM};
use cistab::measures::{catalog, DOMAIN};
use cistab::report::SourceReport;
use cistab::sources::FileSource;
use cistab::stability::aggregate;

#[derive(Parser)]
#[command(name = "cistab")]
#[command(author, version, about = "CI Build Stability Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct SourceArgs {
    /// CI sources, e.g. "[Nightly]bamboo:http://ci/browse/NIGHTLY | http://hudson/job/app"
    #[arg(env = "CISTAB_URL")]
    descriptors: Option<String>,

    /// Project CI system, used when no descriptors are given
    #[arg(long, requires = "ci_url")]
    ci_system: Option<String>,

    /// Project CI URL, used when no descriptors are given
    #[arg(long, requires = "ci_system")]
    ci_url: Option<String>,
}

impl SourceArgs {
    fn resolve(&self) -> Vec<CiSourceDescriptor> {
        let fallback = match (&self.ci_system, &self.ci_url) {
            (Some(system), Some(url)) => Some(CiManagement {
                system: system.clone(),
                url: url.clone(),
            }),
            _ => None,
        };

        resolve_descriptors(self.descriptors.as_deref(), fallback.as_ref())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse CI source descriptors
    Parse {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Compute stability metrics for a JSON file of build records
    Analyze {
        /// JSON array of build records
        #[arg(short, long)]
        builds: PathBuf,

        /// Label reported for the source
        #[arg(short, long, default_value = "")]
        label: String,

        /// Source index used in measure keys
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Retrieve builds from every CI source and compute their stability
    Collect {
        #[command(flatten)]
        sources: SourceArgs,

        /// Number of days of build history to analyze
        #[arg(short, long, env = "CISTAB_DAYS", default_value_t = DEFAULT_LOOKBACK_DAYS)]
        days: u32,

        /// Username for CI sources behind basic authentication
        #[arg(short, long, env = "CISTAB_USERNAME")]
        username: Option<String>,

        /// Password for CI sources behind basic authentication
        #[arg(long, env = "CISTAB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List the metric keys published for the first N sources
    Metrics {
        #[arg(short, long, default_value_t = 10)]
        sources: usize,
    },
}

#[derive(Serialize)]
struct MetricsCatalog<T: Serialize> {
    domain: &'static str,
    metrics: T,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Parse { sources } => {
                let descriptors = sources.resolve();
                info!("Parsed {} CI sources", descriptors.len());
                self.emit(&descriptors)
            }
            Commands::Analyze {
                builds,
                label,
                index,
            } => {
                info!("Analyzing builds from: {}", builds.display());

                let records = FileSource::new(builds.clone()).read_all().await?;
                let descriptor = CiSourceDescriptor::new(
                    label.as_str(),
                    DEFAULT_SYSTEM,
                    builds.to_string_lossy(),
                );
                let report = SourceReport::new(*index, descriptor, aggregate(&records, label));

                self.emit(&report)
            }
            Commands::Collect {
                sources,
                days,
                username,
                password,
            } => {
                let descriptors = sources.resolve();
                if descriptors.is_empty() {
                    warn!("No CI sources configured");
                }

                let settings = CollectSettings {
                    window: LookbackWindow::new(*days),
                    credentials: Credentials::from_parts(username.as_deref(), password.as_deref()),
                };
                let report = collect(descriptors, &settings).await;

                self.emit(&report)
            }
            Commands::Metrics { sources } => self.emit(&MetricsCatalog {
                domain: DOMAIN,
                metrics: catalog(*sources),
            }),
        }
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        Ok(())
    }
}
