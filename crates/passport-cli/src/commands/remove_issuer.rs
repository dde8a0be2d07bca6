//! `passport remove-issuer` — Remove a wallet from the verified issuers.

use clap::Args;

use passport_client::PassportProgram;

use crate::context::{parse_address, Context};

#[derive(Args, Debug)]
pub struct RemoveIssuerArgs {
    /// Wallet address of the issuer.
    pub issuer: String,
}

pub async fn run(ctx: &Context, args: &RemoveIssuerArgs) -> anyhow::Result<()> {
    let issuer = parse_address(&args.issuer)?;
    let program = ctx.signer()?;

    let registry = program
        .fetch_registry()
        .await?
        .ok_or_else(|| anyhow::anyhow!("Registry not initialized. Run: passport init-registry"))?;
    if !registry.is_verified(&issuer) {
        println!("{} is not a verified issuer, nothing to remove.", issuer);
        return Ok(());
    }

    let signature = program.remove_issuer(&issuer).await?;
    println!("Issuer removed.");
    println!("  Transaction: {}", signature);
    println!("  Explorer:    {}", ctx.tx_link(&signature));
    Ok(())
}
