use clap::{Parser, Subcommand};
use gallery_prep::config::{self, GalleryConfig};
use gallery_prep::prepare::{self, PrepareSettings};
use gallery_prep::service::{CloudinaryService, Credentials};
use gallery_prep::{listing, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gallery-prep")]
#[command(about = "Prepare image data and blur-up placeholders for a static page")]
#[command(long_about = "\
Prepare image data and blur-up placeholders for a static page

Lists the newest images in a hosted media folder, downloads a tiny rendition
of each one in parallel, and writes the page data the site renderer consumes:

  {
    \"folder\": \"teachers-day\",
    \"images\": [
      { \"id\": 0, \"width\": 1200, \"height\": 800,
        \"public_id\": \"teachers-day/photo-5\", \"format\": \"jpg\",
        \"blur_data_url\": \"data:image/jpeg;base64,...\" }
    ]
  }

Environment:
  CLOUDINARY_CLOUD_NAME   account name (overrides service.cloud_name)
  CLOUDINARY_FOLDER       folder to list (overrides listing.folder)
  CLOUDINARY_API_KEY      API key (required for list/prepare)
  CLOUDINARY_API_SECRET   API secret (required for list/prepare)
  RUST_LOG                log filter, e.g. gallery_prep=debug

Any failure fails the whole run; no partial page data is written.

Run 'gallery-prep gen-config' to generate a documented gallery-prep.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log requests and per-image progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the images that would appear on the page
    List,
    /// List images, generate placeholders, and write the page data
    Prepare {
        /// Page data output file
        #[arg(long, short, default_value = "page-data.json")]
        output: PathBuf,
    },
    /// Validate configuration and credentials without network access
    Check,
    /// Print a stock gallery-prep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::List => {
            let config = config::load_config(&cli.config)?;
            let service = connect(&config)?;
            let records =
                listing::list_images(&service, &config.listing.folder, config.listing.max_results)?;
            output::print_listing_output(&config.listing.folder, &records);
        }
        Command::Prepare { output: out_path } => {
            let config = config::load_config(&cli.config)?;
            let service = connect(&config)?;

            println!("==> Preparing {}", config.listing.folder);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_prepare_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = prepare::prepare(&service, &PrepareSettings::from_config(&config), Some(tx));
            // The sender is dropped once prepare returns, so the printer drains and exits.
            output::join_printer(printer);
            let page = result?;

            prepare::write_page_data(&page, &out_path)?;
            println!();
            output::print_page_summary(&page, &out_path);
        }
        Command::Check => {
            println!("==> Checking {}", describe_config_path(&cli.config));
            let config = config::load_config(&cli.config)?;
            config.validate_remote()?;
            Credentials::from_env()?;
            println!(
                "Folder {} on {}, up to {} images",
                config.listing.folder, config.service.cloud_name, config.listing.max_results
            );
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build the HTTP service after remote-only validation.
fn connect(config: &GalleryConfig) -> Result<CloudinaryService, Box<dyn std::error::Error>> {
    config.validate_remote()?;
    let credentials = Credentials::from_env()?;
    Ok(CloudinaryService::new(&config.service, credentials)?)
}

/// Diagnostics go to stderr; stdout stays for the pipeline output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "gallery_prep=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn describe_config_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    }
}
