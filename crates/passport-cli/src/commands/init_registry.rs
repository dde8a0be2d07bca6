//! `passport init-registry` — Create the issuer registry.

use clap::Args;

use passport_client::{PassportProgram, LAMPORTS_PER_SOL};
use passport_crypto::issuer_registry_address;

use crate::context::{format_sol, Context};

#[derive(Args, Debug)]
pub struct InitRegistryArgs {
    /// SOL to request when the wallet is empty.
    #[arg(long, default_value_t = 10.0)]
    pub airdrop: f64,
}

pub async fn run(ctx: &Context, args: &InitRegistryArgs) -> anyhow::Result<()> {
    let program = ctx.signer()?;
    let authority = program
        .payer()
        .ok_or_else(|| anyhow::anyhow!("no wallet loaded"))?;
    let (registry, _) = issuer_registry_address(&program.program_id())?;

    println!("Authority wallet: {}", authority);
    println!("Network:          {}", ctx.config.cluster.rpc_url());
    println!("Program ID:       {}", program.program_id());
    println!("Registry PDA:     {}", registry);

    let balance = program.balance(&authority).await?;
    println!("Balance:          {}", format_sol(balance));
    if balance == 0 {
        println!("Requesting airdrop...");
        let lamports = (args.airdrop * LAMPORTS_PER_SOL as f64) as u64;
        program.request_airdrop(&authority, lamports).await?;
        println!("Airdrop successful");
    }

    if let Some(existing) = program.fetch_registry().await? {
        println!();
        println!("Registry already initialized!");
        println!("  Authority:        {}", existing.authority);
        println!("  Verified issuers: {}", existing.verified_issuers.len());
        return Ok(());
    }

    let signature = program.initialize_registry().await?;
    println!();
    println!("Registry initialized!");
    println!("  Transaction: {}", signature);
    println!("  Explorer:    {}", ctx.tx_link(&signature));
    println!();
    println!("Next: passport add-issuer <WALLET_ADDRESS>");
    Ok(())
}
