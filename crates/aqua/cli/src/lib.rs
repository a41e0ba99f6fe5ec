//! Aqua CLI - build, link and verify Aqua trees from the terminal
//!
//! Trees are stored as pretty-printed JSON next to the files they document
//! (`<file>.aqua.json` by default). Every command that extends a tree rewrites
//! that file in place.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;
mod store;

use aqua_chain::{RevisionBuilder, TreeLinker};
use commands::{build, inspect, keys, link};
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Aqua CLI application
#[derive(Parser)]
#[command(name = "aqua")]
#[command(about = "Aqua - content-addressed revision chains", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/aqua/config.toml)
    #[arg(long, env = "AQUA_CONFIG", global = true)]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tree documenting a file
    Create {
        file: PathBuf,
        /// Document name recorded in the file index (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Where to write the tree (defaults to <file>.aqua.json)
        #[arg(long = "out")]
        out: Option<PathBuf>,
    },

    /// Start a tree from key=value form fields
    Form {
        name: String,
        #[arg(required = true, value_parser = store::parse_field)]
        fields: Vec<(String, String)>,
        #[arg(long = "out")]
        out: PathBuf,
    },

    /// Append a form revision
    AppendForm {
        tree: PathBuf,
        #[arg(required = true, value_parser = store::parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Append a file revision
    AppendFile { tree: PathBuf, file: PathBuf },

    /// Sign the head revision
    Sign {
        tree: PathBuf,
        /// Ed25519 secret key as 64 hex digits
        #[arg(long, env = "AQUA_SIGNING_KEY", hide_env_values = true)]
        key_hex: String,
    },

    /// Link another tree onto the head of a host tree
    Link { host: PathBuf, target: PathBuf },

    /// Remove the head revision
    DeleteHead { tree: PathBuf },

    /// List revisions in canonical order
    Order { tree: PathBuf },

    /// Verify every revision of a tree
    Verify {
        tree: PathBuf,
        /// Local copies of content the tree references
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Remote content as name=url, fetched over HTTP
        #[arg(long = "remote", value_parser = store::parse_field)]
        remotes: Vec<(String, String)>,
        /// Trees to search when resolving deep links
        #[arg(long = "candidate")]
        candidates: Vec<PathBuf>,
    },

    /// Resolve the target of a link revision
    ResolveLink {
        tree: PathBuf,
        link: String,
        #[arg(long = "candidate")]
        candidates: Vec<PathBuf>,
    },

    /// Generate a signing key
    Keygen,

    /// Show the effective configuration
    Config,
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let filter = if cli.verbose { "debug" } else { "info" };
    // A subscriber may already be installed when run repeatedly in one process.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .try_init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let builder = RevisionBuilder::new(config.chain.clone());
    let linker = TreeLinker::new(config.chain.clone());
    let format = cli.output;

    match cli.command {
        Commands::Create { file, name, out } => build::create(&builder, &file, name, out),
        Commands::Form { name, fields, out } => build::form(&builder, &name, fields, &out),
        Commands::AppendForm { tree, fields } => build::append_form(&builder, &tree, fields),
        Commands::AppendFile { tree, file } => build::append_file(&builder, &tree, &file),
        Commands::Sign { tree, key_hex } => build::sign(&builder, &tree, &key_hex),
        Commands::Link { host, target } => link::link(&linker, &host, &target),
        Commands::DeleteHead { tree } => build::delete_head(&builder, &tree),
        Commands::Order { tree } => inspect::order(&tree, format),
        Commands::Verify {
            tree,
            files,
            remotes,
            candidates,
        } => {
            let inputs = inspect::VerifyInputs {
                files,
                remotes,
                candidates,
            };
            inspect::verify(&config.verifier, &tree, &inputs, format).await
        }
        Commands::ResolveLink {
            tree,
            link,
            candidates,
        } => link::resolve_link(&tree, &link, &candidates, format),
        Commands::Keygen => keys::generate(format),
        Commands::Config => output::print_single(&config, format),
    }
}
