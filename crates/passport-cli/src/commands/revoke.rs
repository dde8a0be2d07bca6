//! `passport revoke` — Revoke a credential the wallet issued.

use clap::Args;

use passport_client::{PassportProgram, RevokeCredentialRequest};
use passport_crypto::credential_mint_address;

use crate::context::{parse_address, Context};

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Student wallet address the credential was issued to.
    pub student: String,
}

pub async fn run(ctx: &Context, args: &RevokeArgs) -> anyhow::Result<()> {
    let student = parse_address(&args.student)?;
    let program = ctx.signer()?;
    let issuer = program
        .payer()
        .ok_or_else(|| anyhow::anyhow!("no wallet loaded"))?;
    let (credential, _) = credential_mint_address(&issuer, &student, &program.program_id())?;

    match program.fetch_credential(&credential).await? {
        None => anyhow::bail!("no credential from {} to {}", issuer, student),
        Some(record) if record.is_revoked => {
            println!("Credential {} is already revoked.", credential);
            return Ok(());
        }
        Some(_) => {}
    }

    let signature = program
        .revoke_credential(&RevokeCredentialRequest { student })
        .await?;
    println!("Credential revoked.");
    println!("  Credential PDA: {}", credential);
    println!("  Transaction:    {}", signature);
    println!("  Explorer:       {}", ctx.tx_link(&signature));
    Ok(())
}
