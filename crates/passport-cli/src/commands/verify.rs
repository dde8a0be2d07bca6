//! `passport verify` — Check a credential record on-chain.

use clap::Args;

use passport_client::{CredentialMint, PassportProgram};
use passport_crypto::{credential_mint_address, Pubkey};

use crate::context::{parse_address, Context};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential record address. Derived from --issuer and --student when omitted.
    #[arg(required_unless_present_all = ["issuer", "student"])]
    pub credential: Option<String>,

    #[arg(long, requires = "student")]
    pub issuer: Option<String>,

    #[arg(long, requires = "issuer")]
    pub student: Option<String>,
}

fn print_credential(address: &Pubkey, credential: &CredentialMint) {
    println!("Credential: {}", address);
    println!("  Name:     {}", credential.name);
    println!("  Symbol:   {}", credential.symbol);
    println!("  Type:     {}", credential.credential_type);
    println!("  Student:  {}", credential.student);
    println!("  Issuer:   {}", credential.issuer);
    println!("  Mint:     {}", credential.mint);
    println!("  URI:      {}", credential.uri);
    match credential.issued_at_utc() {
        Some(at) => println!("  Issued:   {}", at.to_rfc3339()),
        None => println!("  Issued:   {} (unix)", credential.issued_at),
    }
}

pub async fn run(ctx: &Context, args: &VerifyArgs) -> anyhow::Result<()> {
    let program = ctx.reader()?;
    let address = match (&args.credential, &args.issuer, &args.student) {
        (Some(credential), _, _) => parse_address(credential)?,
        (None, Some(issuer), Some(student)) => {
            credential_mint_address(
                &parse_address(issuer)?,
                &parse_address(student)?,
                &program.program_id(),
            )?
            .0
        }
        _ => anyhow::bail!("give a credential address or both --issuer and --student"),
    };

    let credential = program
        .fetch_credential(&address)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no credential record at {}", address))?;
    print_credential(&address, &credential);

    let registry = program.fetch_registry().await?;
    let issuer_verified = registry.is_some_and(|r| r.is_verified(&credential.issuer));
    println!(
        "  Issuer verified: {}",
        if issuer_verified { "yes" } else { "no (removed since issuance)" }
    );

    if credential.is_revoked {
        anyhow::bail!("credential {} has been revoked", address);
    }
    println!("Status: VALID");
    Ok(())
}
