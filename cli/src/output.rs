/// Output of `kagi resolve`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON summary
    Json,
    /// Canonical key as a PRIVATE KEY PEM block
    Pem,
    /// Hex dump of the canonical DER
    Hex,
}

/// Output of `kagi normalize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum KeyFormat {
    Pem,
    Hex,
}
