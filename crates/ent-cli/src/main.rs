use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ent_cli::commands::{audit, hash, keys, verify, version};
use ent_cli::{report, runtime};
use ent_service::ServiceError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Entrustory CLI: signed, Merkle-rooted versions of file sets.
#[derive(Parser, Debug)]
#[command(name = "entrustory", author = "Entrustory Contributors", version)]
struct Cli {
    /// Path to the JSON store (overrides configuration)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new Ed25519 keypair (PKCS#8/SPKI DER, base64)
    Keygen {
        /// Optional output path for the keypair (default: prints to stdout)
        output: Option<PathBuf>,
    },
    /// Show the active signing key's public half
    PublicKey,
    /// Compute SHA-256 digests of files
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Create or inspect versions
    #[command(subcommand)]
    Version(VersionCommand),
    /// Check a file against a stored version
    Verify {
        version_id: String,
        /// File to hash and check
        #[arg(required_unless_present = "hash")]
        file: Option<PathBuf>,
        /// Precomputed SHA-256 digest to check instead of a file
        #[arg(long, conflicts_with = "file")]
        hash: Option<String>,
    },
    /// List timeline events for a work item
    Timeline { work_item_id: String },
    /// List verification attempts for a version
    Logs { version_id: String },
}

#[derive(Subcommand, Debug)]
enum VersionCommand {
    /// Hash files and record them as a new signed version
    Create {
        /// Work item the version belongs to
        #[arg(long)]
        work_item: String,
        /// Files to include
        #[arg(required_unless_present = "manifest")]
        files: Vec<PathBuf>,
        /// JSON array of file entries to use instead of files on disk
        #[arg(long, conflicts_with = "files")]
        manifest: Option<PathBuf>,
    },
    /// Print a stored version
    Show { version_id: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast_ref::<ServiceError>() {
                Some(service_err) => eprintln!(
                    "{}",
                    report::render_service_error(service_err, report::use_colors())
                ),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let Cli {
        store,
        config,
        json,
        command,
    } = cli;
    let load = || runtime::load_config(config.as_deref(), store.clone());
    let open = || -> Result<runtime::FileIntegrityService> { runtime::open_service(&load()?) };

    match command {
        Commands::Keygen { output } => keys::cmd_keygen(output, json).map(|()| true),
        Commands::Hash { files } => hash::cmd_hash(files, json).map(|()| true),
        Commands::PublicKey => {
            let signing = load()?
                .signing
                .signing_context()
                .context("failed to initialise signing key")?;
            keys::cmd_public_key(&signing, json).map(|()| true)
        }
        Commands::Version(VersionCommand::Create {
            work_item,
            files,
            manifest,
        }) => version::cmd_create(&open()?, &work_item, files, manifest, json).map(|()| true),
        Commands::Version(VersionCommand::Show { version_id }) => {
            version::cmd_show(&open()?, &version_id, json).map(|()| true)
        }
        Commands::Verify {
            version_id,
            file,
            hash,
        } => verify::cmd_verify(&open()?, &version_id, file, hash, json),
        Commands::Timeline { work_item_id } => {
            audit::cmd_timeline(&open()?, &work_item_id, json).map(|()| true)
        }
        Commands::Logs { version_id } => {
            audit::cmd_logs(&open()?, &version_id, json).map(|()| true)
        }
    }
}
