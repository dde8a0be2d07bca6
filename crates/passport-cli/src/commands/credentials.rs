//! `passport credentials` — List the credentials a student holds.

use clap::Args;

use passport_client::PassportProgram;
use passport_core::config::truncate_address;

use crate::context::{parse_address, Context};

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    /// Student wallet address. Defaults to the configured wallet.
    pub student: Option<String>,

    /// Include revoked credentials.
    #[arg(long)]
    pub all: bool,
}

pub async fn run(ctx: &Context, args: &CredentialsArgs) -> anyhow::Result<()> {
    let student = match &args.student {
        Some(address) => parse_address(address)?,
        None => ctx.keypair()?.pubkey(),
    };
    let program = ctx.reader()?;

    let credentials: Vec<_> = program
        .credentials_for_student(&student)
        .await?
        .into_iter()
        .filter(|(_, c)| args.all || c.is_active())
        .collect();

    println!("Credentials for {}: {}", student, credentials.len());
    for (address, credential) in &credentials {
        let issued = credential
            .issued_at_utc()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "  {} {:<32} {:<18} issuer {} {}{}",
            issued,
            credential.name,
            credential.credential_type,
            truncate_address(&credential.issuer.to_string(), 4),
            truncate_address(&address.to_string(), 4),
            if credential.is_revoked { " [REVOKED]" } else { "" }
        );
    }
    if credentials.is_empty() {
        println!("  (none)");
    }
    Ok(())
}
