//! `passport add-issuer` — Add a wallet to the verified issuers.

use clap::Args;

use passport_client::PassportProgram;
use passport_crypto::issuer_registry_address;

use crate::context::{parse_address, Context};

#[derive(Args, Debug)]
pub struct AddIssuerArgs {
    /// Wallet address of the issuer.
    pub issuer: String,
}

pub async fn run(ctx: &Context, args: &AddIssuerArgs) -> anyhow::Result<()> {
    let issuer = parse_address(&args.issuer)?;
    let program = ctx.signer()?;
    let (registry_address, _) = issuer_registry_address(&program.program_id())?;

    if let Some(authority) = program.payer() {
        println!("Authority wallet: {}", authority);
    }
    println!("Adding issuer:    {}", issuer);
    println!("Registry PDA:     {}", registry_address);

    let registry = program
        .fetch_registry()
        .await?
        .ok_or_else(|| anyhow::anyhow!("Registry not initialized. Run: passport init-registry"))?;
    println!("Current verified issuers: {}", registry.verified_issuers.len());

    if registry.is_verified(&issuer) {
        println!("Issuer already verified!");
        return Ok(());
    }

    let signature = program.add_issuer(&issuer).await?;
    println!();
    println!("Issuer added successfully!");
    println!("  Transaction: {}", signature);
    println!("  Issuer:      {}", issuer);
    println!();
    println!("This wallet can now mint credentials.");
    Ok(())
}
