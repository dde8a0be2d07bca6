//! `passport derive` — Print the program-derived addresses.

use clap::Args;

use passport_crypto::{
    associated_token_address, credential_mint_address, issuer_registry_address, mint_address,
};

use crate::context::{parse_address, Context};

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Issuer wallet, for the credential addresses.
    #[arg(long, requires = "student")]
    pub issuer: Option<String>,

    /// Student wallet, for the credential addresses.
    #[arg(long, requires = "issuer")]
    pub student: Option<String>,
}

pub fn run(ctx: &Context, args: &DeriveArgs) -> anyhow::Result<()> {
    let program_id = ctx.program_id()?;
    let (registry, bump) = issuer_registry_address(&program_id)?;
    println!("Program ID:       {}", program_id);
    println!("Issuer registry:  {} (bump {})", registry, bump);

    if let (Some(issuer), Some(student)) = (&args.issuer, &args.student) {
        let issuer = parse_address(issuer)?;
        let student = parse_address(student)?;
        let (credential, bump) = credential_mint_address(&issuer, &student, &program_id)?;
        let (mint, mint_bump) = mint_address(&credential, &program_id)?;
        let token_account = associated_token_address(&student, &mint)?;

        println!("Credential PDA:   {} (bump {})", credential, bump);
        println!("Mint:             {} (bump {})", mint, mint_bump);
        println!("Token account:    {}", token_account);
        println!("Explorer:         {}", ctx.address_link(&credential));
    }
    Ok(())
}
