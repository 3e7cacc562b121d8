use tracing::warn;

use crate::error::KeyError;
use crate::material::KeyMaterial;
use crate::spec::CredentialSpec;

/// How a caller treats key resolution failures.
///
/// The resolver always fails hard; softening is decided here, by the caller,
/// and never by process-wide state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Every error aborts connection setup.
    #[default]
    Strict,
    /// A downgradable error becomes a warning when the credential has a
    /// password to fall back to.
    Lenient,
}

impl ErrorPolicy {
    /// Map a "treat warnings as errors" switch onto a policy.
    pub fn from_warn_error(warn_error: bool) -> Self {
        if warn_error {
            ErrorPolicy::Strict
        } else {
            ErrorPolicy::Lenient
        }
    }

    pub fn apply(
        self,
        spec: &CredentialSpec,
        result: Result<Option<KeyMaterial>, KeyError>,
    ) -> Result<Option<KeyMaterial>, KeyError> {
        match result {
            Err(err)
                if self == ErrorPolicy::Lenient
                    && err.kind().is_downgradable()
                    && spec.password().is_some() =>
            {
                warn!(
                    kind = %err.kind(),
                    error = %err,
                    "ignoring private key, falling back to password authentication"
                );
                Ok(None)
            }
            other => other,
        }
    }
}
