use clap::Args;
use kagi_credential::{CredentialSpec, KeyResolver};

use crate::error::{Error, Result};
use crate::output::KeyFormat;
use crate::utils::print_key;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to a PEM or DER private key
    pub(crate) file: String,

    /// Read the passphrase from this environment variable
    #[arg(long, value_name = "VAR")]
    pub(crate) passphrase_env: Option<String>,

    /// Output format (pem, hex)
    #[arg(short, long, default_value = "pem")]
    pub(crate) output: KeyFormat,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let mut spec = CredentialSpec::new("", "", "", "").with_private_key_path(&config.file);
    if let Some(var) = &config.passphrase_env {
        let passphrase = std::env::var(var).map_err(|_| Error::PassphraseEnv(var.clone()))?;
        spec = spec.with_private_key_passphrase(passphrase);
    }

    // a path source always yields a key or an error
    if let Some(key) = KeyResolver::resolve(&spec)? {
        print_key(&key, config.output);
    }
    Ok(())
}
