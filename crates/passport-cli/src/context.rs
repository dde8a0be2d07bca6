//! Resolved configuration and the handles commands build from it.

use anyhow::{anyhow, Context as _};

use passport_client::{ConfirmPolicy, RpcClient, RpcPassportProgram, LAMPORTS_PER_SOL};
use passport_core::config::ExplorerKind;
use passport_core::{Catalog, Course, PassportConfig};
use passport_crypto::{Keypair, Pubkey, Signature};
use passport_progress::{ProgressTracker, RocksProgressRepository};

use crate::GlobalArgs;

pub struct Context {
    pub config: PassportConfig,
    pub catalog: Catalog,
}

impl Context {
    /// Config file, then `PASSPORT_*` environment, then flags.
    pub fn load(args: &GlobalArgs) -> anyhow::Result<Self> {
        let mut config = PassportConfig::load(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?;
        config.apply_env()?;

        if let Some(network) = &args.network {
            config.cluster.network = network.parse()?;
        }
        if let Some(url) = &args.rpc_url {
            config.cluster.rpc_url = Some(url.clone());
        }
        if let Some(program_id) = &args.program_id {
            config.cluster.program_id = program_id.clone();
        }
        if let Some(path) = &args.keypair {
            config.wallet.keypair_path = path.clone();
        }
        if let Some(path) = &args.store {
            config.progress.store_path = path.clone();
        }
        if let Some(level) = &args.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            config.logging.format = format.clone();
        }

        let catalog = match &args.catalog {
            Some(path) => Catalog::from_toml_file(path)?,
            None => Catalog::builtin()?,
        };

        Ok(Self { config, catalog })
    }

    pub fn program_id(&self) -> anyhow::Result<Pubkey> {
        let id = &self.config.cluster.program_id;
        id.parse()
            .map_err(|e| anyhow!("invalid program id {}: {}", id, e))
    }

    pub fn keypair(&self) -> anyhow::Result<Keypair> {
        Keypair::read_from_file(&self.config.wallet.keypair_path)
            .context("Run: solana-keygen new")
    }

    pub fn rpc(&self) -> RpcClient {
        RpcClient::new(
            self.config.cluster.rpc_url(),
            self.config.cluster.commitment.clone(),
        )
    }

    /// Program client without a wallet, for reads.
    pub fn reader(&self) -> anyhow::Result<RpcPassportProgram> {
        Ok(RpcPassportProgram::new(self.rpc(), self.program_id()?)
            .with_confirm_policy(ConfirmPolicy::from(&self.config.cluster)))
    }

    /// Program client signing with the configured wallet.
    pub fn signer(&self) -> anyhow::Result<RpcPassportProgram> {
        Ok(self.reader()?.with_payer(self.keypair()?))
    }

    pub fn tracker(&self) -> anyhow::Result<ProgressTracker<RocksProgressRepository>> {
        let path = &self.config.progress.store_path;
        let repo = RocksProgressRepository::open(path)
            .with_context(|| format!("failed to open progress store at {}", path.display()))?;
        Ok(ProgressTracker::new(repo))
    }

    pub fn course(&self, course_id: &str) -> anyhow::Result<&Course> {
        Ok(self.catalog.require(course_id)?)
    }

    pub fn tx_link(&self, signature: &Signature) -> String {
        self.config
            .cluster
            .explorer_url(ExplorerKind::Transaction, &signature.to_string())
    }

    pub fn address_link(&self, address: &Pubkey) -> String {
        self.config
            .cluster
            .explorer_url(ExplorerKind::Address, &address.to_string())
    }
}

/// Parse a base58 wallet address given on the command line.
pub fn parse_address(value: &str) -> anyhow::Result<Pubkey> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid wallet address: {}", value))
}

pub fn format_sol(lamports: u64) -> String {
    format!("{} SOL", lamports as f64 / LAMPORTS_PER_SOL as f64)
}
