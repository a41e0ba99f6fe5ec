use serde::Serialize;

use aqua_chain::{Ed25519Wallet, RevisionSigner};

use crate::error::CliResult;
use crate::output::{print_single, OutputFormat};

#[derive(Serialize)]
struct KeyView {
    wallet_address: String,
    public_key: String,
    secret_key: String,
}

/// Generate a fresh Ed25519 wallet.
pub fn generate(format: OutputFormat) -> CliResult<()> {
    let wallet = Ed25519Wallet::generate();
    let view = KeyView {
        wallet_address: wallet.wallet_address(),
        public_key: wallet.public_key_hex(),
        secret_key: wallet.secret_hex(),
    };
    print_single(&view, format)
}
