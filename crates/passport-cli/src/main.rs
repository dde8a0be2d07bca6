//! Passport CLI — Command-line interface for the APEC Learner Passport.
//!
//! Subcommands: init-registry, add-issuer, remove-issuer, airdrop, status,
//! mint, revoke, verify, credentials, derive, courses, progress.

mod commands;
mod context;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use context::Context;

/// Passport — Verifiable course credentials for APEC learners.
#[derive(Parser, Debug)]
#[command(name = "passport", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand. Flags win over environment
/// variables, which win over the config file.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Path to the configuration file (TOML).
    #[arg(long, global = true, default_value = "passport.toml")]
    pub config: PathBuf,

    /// RPC endpoint URL.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Credential program id.
    #[arg(long, global = true)]
    pub program_id: Option<String>,

    /// Cluster: localnet, devnet, testnet or mainnet-beta.
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Keypair file used to sign transactions.
    #[arg(long, global = true)]
    pub keypair: Option<PathBuf>,

    /// Course catalog (TOML) replacing the built-in one.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Directory of the local progress database.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json).
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the issuer registry with the wallet as authority.
    InitRegistry(commands::init_registry::InitRegistryArgs),
    /// Add a verified issuer (registry authority only).
    AddIssuer(commands::add_issuer::AddIssuerArgs),
    /// Remove a verified issuer (registry authority only).
    RemoveIssuer(commands::remove_issuer::RemoveIssuerArgs),
    /// Request an airdrop on localnet, devnet or testnet.
    Airdrop(commands::airdrop::AirdropArgs),
    /// Show the issuer registry.
    Status(commands::status::StatusArgs),
    /// Mint a credential to a student (verified issuers only).
    Mint(commands::mint::MintArgs),
    /// Revoke a credential the wallet issued.
    Revoke(commands::revoke::RevokeArgs),
    /// Check a credential record.
    Verify(commands::verify::VerifyArgs),
    /// List credentials held by a student.
    Credentials(commands::credentials::CredentialsArgs),
    /// Print program-derived addresses.
    Derive(commands::derive::DeriveArgs),
    /// List catalog courses.
    Courses(commands::courses::CoursesArgs),
    /// Track local course progress and claim credentials.
    #[command(subcommand)]
    Progress(commands::progress::ProgressCommand),
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.with_target(true).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let ctx = Context::load(&cli.global)?;
    init_tracing(&ctx.config.logging.level, &ctx.config.logging.format);
    tracing::debug!(
        rpc_url = %ctx.config.cluster.rpc_url(),
        program_id = %ctx.config.cluster.program_id,
        network = %ctx.config.cluster.network,
        "configuration loaded"
    );

    match &cli.command {
        Commands::InitRegistry(args) => commands::init_registry::run(&ctx, args).await,
        Commands::AddIssuer(args) => commands::add_issuer::run(&ctx, args).await,
        Commands::RemoveIssuer(args) => commands::remove_issuer::run(&ctx, args).await,
        Commands::Airdrop(args) => commands::airdrop::run(&ctx, args).await,
        Commands::Status(args) => commands::status::run(&ctx, args).await,
        Commands::Mint(args) => commands::mint::run(&ctx, args).await,
        Commands::Revoke(args) => commands::revoke::run(&ctx, args).await,
        Commands::Verify(args) => commands::verify::run(&ctx, args).await,
        Commands::Credentials(args) => commands::credentials::run(&ctx, args).await,
        Commands::Derive(args) => commands::derive::run(&ctx, args),
        Commands::Courses(args) => commands::courses::run(&ctx, args),
        Commands::Progress(cmd) => commands::progress::run(&ctx, cmd).await,
    }
}
