use clap::Args;
use kagi_credential::{AuthArgs, ErrorPolicy, Profile};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::output::{KeyFormat, OutputFormat};
use crate::utils::print_key;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the TOML profile
    pub(crate) profile: String,

    /// Target to resolve. Defaults to the profile's `target`, or its only target
    #[arg(short, long)]
    pub(crate) target: Option<String>,

    /// Treat key warnings as errors instead of falling back to the password
    #[arg(long)]
    pub(crate) warn_error: bool,

    /// Output format (text, json, pem, hex)
    #[arg(short, long, default_value = "text")]
    pub(crate) output: OutputFormat,
}

#[derive(Serialize)]
struct Summary<'a> {
    target: &'a str,
    account: &'a str,
    user: &'a str,
    database: &'a str,
    schema: &'a str,
    auth: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_bytes: Option<usize>,
}

impl<'a> Summary<'a> {
    fn new(target: &'a str, args: &'a AuthArgs) -> Self {
        let auth = match (&args.private_key, &args.password) {
            (Some(_), _) => "key-pair",
            (None, Some(_)) => "password",
            (None, None) => "none",
        };
        Summary {
            target,
            account: &args.account,
            user: &args.user,
            database: &args.database,
            schema: &args.schema,
            auth,
            key_bytes: args.private_key.as_ref().map(|key| key.len()),
        }
    }
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let profile = Profile::from_path(&config.profile)?;
    let (name, spec) = match config.target.as_deref() {
        Some(name) => (name, profile.target(name)?),
        None => (
            profile.default_target_name().unwrap_or_default(),
            profile.default_target()?,
        ),
    };

    let policy = ErrorPolicy::from_warn_error(config.warn_error);
    debug!(target_name = name, ?policy, "resolving credential");
    let args = spec.auth_args(policy)?;

    match config.output {
        OutputFormat::Text => {
            let summary = Summary::new(name, &args);
            println!("Target: {}", summary.target);
            println!("Account: {}", summary.account);
            println!("User: {}", summary.user);
            println!("Database: {}", summary.database);
            println!("Schema: {}", summary.schema);
            match summary.key_bytes {
                Some(len) => println!("Auth: {} ({} byte PKCS#8 key)", summary.auth, len),
                None => println!("Auth: {}", summary.auth),
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Summary::new(name, &args))?);
        }
        OutputFormat::Pem | OutputFormat::Hex => {
            let key = args
                .private_key
                .as_ref()
                .ok_or_else(|| Error::NoKeyMaterial(name.to_string()))?;
            let format = if config.output == OutputFormat::Pem {
                KeyFormat::Pem
            } else {
                KeyFormat::Hex
            };
            print_key(key, format);
        }
    }

    Ok(())
}
