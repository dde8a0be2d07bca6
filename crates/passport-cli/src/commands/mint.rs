//! `passport mint` — Mint a credential to a student.

use chrono::Utc;
use clap::{Args, ValueEnum};

use passport_client::{MintCredentialRequest, PassportProgram};
use passport_core::CredentialType;

use crate::context::{parse_address, Context};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CredentialKind {
    Course,
    Degree,
    SkillBadge,
}

impl From<CredentialKind> for CredentialType {
    fn from(kind: CredentialKind) -> Self {
        match kind {
            CredentialKind::Course => CredentialType::Course,
            CredentialKind::Degree => CredentialType::Degree,
            CredentialKind::SkillBadge => CredentialType::SkillBadge,
        }
    }
}

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Student wallet address.
    pub student: String,

    /// Credential name (max 32 bytes).
    #[arg(short, long)]
    pub name: String,

    /// Token symbol (max 10 bytes).
    #[arg(short, long)]
    pub symbol: String,

    /// Metadata URI (max 64 bytes). Defaults to a placeholder.
    #[arg(short, long)]
    pub uri: Option<String>,

    #[arg(short = 't', long = "type", value_enum, default_value = "course")]
    pub credential_type: CredentialKind,
}

pub async fn run(ctx: &Context, args: &MintArgs) -> anyhow::Result<()> {
    let student = parse_address(&args.student)?;
    let request = MintCredentialRequest {
        student,
        credential_type: args.credential_type.into(),
        name: args.name.clone(),
        symbol: args.symbol.clone(),
        uri: args
            .uri
            .clone()
            .unwrap_or_else(|| format!("ipfs://placeholder/{}", Utc::now().timestamp_millis())),
    };
    request.validate()?;

    let program = ctx.signer()?;
    println!("Minting \"{}\" ({}) to {}...", request.name, request.credential_type, student);
    let minted = program.mint_credential(&request).await?;

    println!("Credential minted!");
    println!("  Transaction:     {}", minted.signature);
    println!("  Credential PDA:  {}", minted.credential_mint);
    println!("  Mint:            {}", minted.mint);
    println!("  Token account:   {}", minted.token_account);
    println!("  Explorer:        {}", ctx.tx_link(&minted.signature));
    Ok(())
}
