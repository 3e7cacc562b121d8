use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::spec::CredentialSpec;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot read profile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid profile: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("target '{0}' is not defined in the profile")]
    UnknownTarget(String),
    #[error("profile defines several targets but no default; set `target` or pick one")]
    NoDefaultTarget,
    #[error("profile defines no targets")]
    EmptyProfile,
}

/// A set of named connection targets loaded from TOML.
///
/// ```toml
/// target = "dev"
///
/// [targets.dev]
/// account = "acme"
/// user = "loader"
/// database = "analytics"
/// schema = "public"
/// private_key_path = "keys/rsa_key.p8"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    targets: BTreeMap<String, CredentialSpec>,
}

impl Profile {
    /// Load a profile file. Relative `private_key_path` values are taken
    /// relative to the directory holding the profile.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut profile: Profile = text.parse()?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for spec in profile.targets.values_mut() {
            spec.rebase_key_path(base);
        }
        debug!(
            path = %path.display(),
            targets = profile.targets.len(),
            "loaded profile"
        );
        Ok(profile)
    }

    pub fn target(&self, name: &str) -> Result<&CredentialSpec, ProfileError> {
        self.targets
            .get(name)
            .ok_or_else(|| ProfileError::UnknownTarget(name.to_string()))
    }

    /// The target named by `target`, or the only target when there is one.
    pub fn default_target(&self) -> Result<&CredentialSpec, ProfileError> {
        if let Some(name) = &self.target {
            return self.target(name);
        }
        let mut specs = self.targets.values();
        match (specs.next(), specs.next()) {
            (Some(spec), None) => Ok(spec),
            (Some(_), Some(_)) => Err(ProfileError::NoDefaultTarget),
            (None, _) => Err(ProfileError::EmptyProfile),
        }
    }

    pub fn default_target_name(&self) -> Option<&str> {
        match &self.target {
            Some(name) => Some(name.as_str()),
            None if self.targets.len() == 1 => self.targets.keys().next().map(String::as_str),
            None => None,
        }
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}

impl FromStr for Profile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;
    use crate::spec::KeySource;

    const PROFILE: &str = r#"
target = "dev"

[targets.dev]
account = "acme"
user = "loader"
database = "analytics"
schema = "public"
private_key_path = "keys/rsa_key.p8"
private_key_passphrase = "password"

[targets.prod]
account = "acme"
user = "svc"
database = "analytics"
schema = "prod"
password = "hunter2"
"#;

    #[test]
    fn test_profile_from_str() {
        let profile: Profile = PROFILE.parse().unwrap();
        assert_eq!(vec!["dev", "prod"], profile.target_names().collect::<Vec<_>>());
        assert_eq!(Some("dev"), profile.default_target_name());

        let dev = profile.default_target().unwrap();
        assert_eq!("loader", dev.user());
        assert_eq!(Some("password"), dev.private_key_passphrase());
        assert_eq!(
            KeySource::Path(Path::new("keys/rsa_key.p8")),
            dev.key_source().unwrap()
        );

        let prod = profile.target("prod").unwrap();
        assert_eq!(Some("hunter2"), prod.password());
        assert_eq!(KeySource::NoKey, prod.key_source().unwrap());
    }

    #[rstest(input, expected,
        case("", "EmptyProfile"),
        case("target = \"missing\"", "UnknownTarget"),
        case("[targets.a]\naccount=\"a\"\nuser=\"u\"\ndatabase=\"d\"\nschema=\"s\"\n[targets.b]\naccount=\"a\"\nuser=\"u\"\ndatabase=\"d\"\nschema=\"s\"\n", "NoDefaultTarget"),
    )]
    fn test_profile_default_target_with_error(input: &str, expected: &str) {
        let profile: Profile = input.parse().unwrap();
        let err = profile.default_target().unwrap_err();
        assert!(format!("{:?}", err).starts_with(expected));
    }

    #[test]
    fn test_profile_error_message_matches_cause() {
        let empty: Profile = "".parse().unwrap();
        assert_eq!(
            "profile defines no targets",
            empty.default_target().unwrap_err().to_string()
        );

        let two: Profile = "[targets.a]\naccount=\"a\"\nuser=\"u\"\ndatabase=\"d\"\nschema=\"s\"\n[targets.b]\naccount=\"a\"\nuser=\"u\"\ndatabase=\"d\"\nschema=\"s\"\n"
            .parse()
            .unwrap();
        assert!(
            two.default_target()
                .unwrap_err()
                .to_string()
                .contains("several targets")
        );
    }

    #[test]
    fn test_profile_single_target_is_default() {
        let profile: Profile =
            "[targets.only]\naccount=\"a\"\nuser=\"u\"\ndatabase=\"d\"\nschema=\"s\"\n"
                .parse()
                .unwrap();
        assert_eq!(Some("only"), profile.default_target_name());
        assert_eq!("u", profile.default_target().unwrap().user());
    }

    #[test]
    fn test_profile_unknown_target() {
        let profile: Profile = PROFILE.parse().unwrap();
        assert!(matches!(
            profile.target("staging"),
            Err(ProfileError::UnknownTarget(name)) if name == "staging"
        ));
    }

    #[rstest(input,
        case("targets = 1"),
        case("[targets.dev]\naccount = \"acme\""),
        case("[targets.dev\n"),
    )]
    fn test_profile_parse_error(input: &str) {
        assert!(matches!(input.parse::<Profile>(), Err(ProfileError::Parse(_))));
    }

    #[test]
    fn test_profile_from_path_rebases_key_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(PROFILE.as_bytes()).unwrap();

        let profile = Profile::from_path(&path).unwrap();
        let dev = profile.target("dev").unwrap();
        assert_eq!(
            Some(dir.path().join("keys/rsa_key.p8").as_path()),
            dev.private_key_path()
        );
    }

    #[test]
    fn test_profile_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Profile::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }
}
