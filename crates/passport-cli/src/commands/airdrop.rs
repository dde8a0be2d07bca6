//! `passport airdrop` — Request test SOL for a wallet.

use clap::Args;

use passport_client::{PassportProgram, LAMPORTS_PER_SOL};

use crate::context::{format_sol, parse_address, Context};

#[derive(Args, Debug)]
pub struct AirdropArgs {
    /// Wallet address to fund.
    pub address: String,

    /// Amount in SOL.
    #[arg(default_value_t = 10.0)]
    pub amount: f64,
}

pub async fn run(ctx: &Context, args: &AirdropArgs) -> anyhow::Result<()> {
    let address = parse_address(&args.address)?;
    if args.amount.is_nan() || args.amount <= 0.0 {
        anyhow::bail!("airdrop amount must be positive, got {}", args.amount);
    }
    let lamports = (args.amount * LAMPORTS_PER_SOL as f64) as u64;
    let program = ctx.reader()?;

    println!("Requesting airdrop of {} SOL...", args.amount);
    println!("  To:      {}", address);
    println!("  Network: {}", ctx.config.cluster.rpc_url());

    let signature = program.request_airdrop(&address, lamports).await?;
    let balance = program.balance(&address).await?;

    println!("Airdrop successful!");
    println!("  Transaction: {}", signature);
    println!("  New balance: {}", format_sol(balance));
    Ok(())
}
