//! Fixtures shared by the integration tests.

use std::path::PathBuf;

use passport_client::{InMemoryProgram, PassportProgram, LAMPORTS_PER_SOL};
use passport_core::config::DEFAULT_PROGRAM_ID;
use passport_crypto::{Keypair, Pubkey};

/// The deployed program id.
pub fn program_id() -> Pubkey {
    DEFAULT_PROGRAM_ID
        .parse()
        .expect("default program id is valid base58")
}

/// A fresh directory path under the system temp dir. Not created.
pub fn temp_store(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "passport-it-{}-{}",
        label,
        rand::random::<u64>()
    ))
}

/// In-memory program whose wallet holds one SOL.
pub fn funded_program() -> InMemoryProgram {
    let program = InMemoryProgram::new(program_id(), Keypair::generate());
    fund(&program);
    program
}

/// Another funded wallet on the same ledger as `program`.
pub fn funded_peer(program: &InMemoryProgram) -> InMemoryProgram {
    let peer = program.connect(Keypair::generate());
    fund(&peer);
    peer
}

fn fund(program: &InMemoryProgram) {
    if let Some(payer) = program.payer() {
        program.fund(&payer, LAMPORTS_PER_SOL);
        tracing::debug!(%payer, "funded test wallet");
    }
}
