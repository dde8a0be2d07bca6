//! `passport status` — Show the issuer registry.

use clap::Args;

use passport_client::PassportProgram;
use passport_crypto::issuer_registry_address;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(ctx: &Context, _args: &StatusArgs) -> anyhow::Result<()> {
    let program = ctx.reader()?;
    let (registry_address, _) = issuer_registry_address(&program.program_id())?;

    println!("Network:      {}", ctx.config.cluster.rpc_url());
    println!("Program ID:   {}", program.program_id());
    println!("Registry PDA: {}", registry_address);
    println!();

    match program.fetch_registry().await? {
        Some(registry) => {
            println!("Registry Status: INITIALIZED");
            println!("  Authority: {}", registry.authority);
            println!("  Bump:      {}", registry.bump);
            println!("  Verified issuers: {}", registry.verified_issuers.len());
            if registry.verified_issuers.is_empty() {
                println!("    (No issuers added yet)");
            } else {
                for (i, issuer) in registry.verified_issuers.iter().enumerate() {
                    println!("    {}. {}", i + 1, issuer);
                }
            }
            println!();
            if registry.verified_issuers.is_empty() {
                println!("Next: passport add-issuer <WALLET_ADDRESS>");
            } else {
                println!("Verified issuers can now mint credentials.");
            }
        }
        None => {
            println!("Registry Status: NOT INITIALIZED");
            println!();
            println!("Next steps:");
            println!("  1. passport init-registry");
            println!("  2. passport add-issuer <WALLET_ADDRESS>");
        }
    }

    Ok(())
}
