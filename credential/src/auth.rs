use zeroize::Zeroizing;

use crate::material::KeyMaterial;

/// Arguments of one authentication request.
///
/// Built by [`CredentialSpec::auth_args`](crate::CredentialSpec::auth_args).
/// The holder embeds `private_key` in its outbound request and drops the value
/// afterwards; secrets are zeroized on drop.
#[derive(Clone)]
pub struct AuthArgs {
    pub account: String,
    pub user: String,
    pub database: String,
    pub schema: String,
    pub password: Option<Zeroizing<String>>,
    pub private_key: Option<KeyMaterial>,
}

impl AuthArgs {
    /// Whether the request authenticates with a key pair.
    pub fn uses_key_pair(&self) -> bool {
        self.private_key.is_some()
    }
}

impl std::fmt::Debug for AuthArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthArgs")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key)
            .finish()
    }
}
