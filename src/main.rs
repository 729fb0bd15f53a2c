use clap::{Parser, Subcommand};
use clinic_content::client::{ContentClient, HttpContentClient};
use clinic_content::content::{GALLERY_QUERY, GalleryItem, SERVICES_QUERY, Service};
use clinic_content::imaging::{CdnImagePipeline, ImageRef, resolve_image_url};
use clinic_content::live::LiveQuery;
use clinic_content::query::{Params, QueryDescriptor, parse_param_arg};
use clinic_content::state::QueryState;
use clinic_content::{config, output};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "clinic-content")]
#[command(about = "Query the clinic website's CMS content")]
#[command(long_about = "\
Query the clinic website's CMS content

Reads published documents from the headless CMS the clinic website is built
on, and resolves image references to CDN URLs. Read-only: nothing here can
modify content.

Configuration (later wins):

  stock defaults
  <config-dir>/config.toml         # see 'clinic-content gen-config'
  CMS_* environment variables      # .env is loaded if present

Examples:

  clinic-content services
  clinic-content query '*[_type == \"service\" && slug.current == $slug][0]' -p slug=implants
  clinic-content image-url image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg --width 1200")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, env = "CLINIC_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a query and print the result
    Query {
        /// Query string, passed to the CMS as-is
        query: String,
        /// Query parameter, referenced as $NAME in the query. Repeatable.
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
    /// List published services with their icons
    Services {
        /// Width of the resolved service image URLs
        #[arg(long, default_value_t = 400)]
        width: u32,
    },
    /// List gallery items with resolved image URLs
    Gallery {
        /// Constrain image URLs to this width
        #[arg(long)]
        width: Option<u32>,
    },
    /// Resolve an image reference to a CDN URL
    ImageUrl {
        /// Asset reference, e.g. image-<id>-<W>x<H>-<format>
        reference: String,
        /// Constrain the URL to this width
        #[arg(long)]
        width: Option<u32>,
    },
    /// Validate configuration and print the effective settings
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clinic_content={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = match config::load_config(&cli.config_dir) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    debug!(endpoint = %site_config.query_endpoint(), "Configuration loaded");

    match cli.command {
        Command::Query { query, params } => {
            let mut parsed = Params::new();
            for arg in &params {
                let (name, value) = parse_param_arg(arg)?;
                parsed.insert(name, value);
            }
            let descriptor = QueryDescriptor::with_params(query, parsed);
            let client = connect(&site_config)?;

            let live: LiveQuery<Value> = LiveQuery::new(client, descriptor.clone());
            let state = live.settled().await;
            output::print_query_output(&descriptor, &state);
            exit_on_failure(&state);
        }
        Command::Services { width } => {
            let client = connect(&site_config)?;
            let pipeline = CdnImagePipeline::new(&site_config);

            let live: LiveQuery<Vec<Service>> =
                LiveQuery::new(client, QueryDescriptor::new(SERVICES_QUERY));
            let state = live.settled().await;
            if let Some(services) = state.data() {
                output::print_services(services, |s| {
                    resolve_image_url(&pipeline, s.image.as_ref(), Some(width))
                });
            }
            exit_on_failure(&state);
        }
        Command::Gallery { width } => {
            let client = connect(&site_config)?;
            let pipeline = CdnImagePipeline::new(&site_config);

            let live: LiveQuery<Vec<GalleryItem>> =
                LiveQuery::new(client, QueryDescriptor::new(GALLERY_QUERY));
            let state = live.settled().await;
            if let Some(items) = state.data() {
                output::print_gallery(items, |item| {
                    resolve_image_url(&pipeline, item.image.as_ref(), width)
                });
            }
            exit_on_failure(&state);
        }
        Command::ImageUrl { reference, width } => {
            let pipeline = CdnImagePipeline::new(&site_config);
            let url = resolve_image_url(&pipeline, Some(&ImageRef::new(reference)), width);
            if url.is_empty() {
                error!("Reference is not an image asset");
                std::process::exit(1);
            }
            println!("{}", url);
        }
        Command::Check => {
            output::print_config(&site_config);
            println!("==> Configuration is valid");
        }
        Command::GenConfig => unreachable!("handled before config load"),
    }

    Ok(())
}

/// Build the process-wide content client.
fn connect(
    site_config: &config::ContentConfig,
) -> Result<Arc<dyn ContentClient>, Box<dyn std::error::Error>> {
    Ok(Arc::new(HttpContentClient::new(site_config)?))
}

fn exit_on_failure<T>(state: &QueryState<T>) {
    if let Some(e) = state.error() {
        error!("Query failed: {}", e);
        std::process::exit(1);
    }
}
