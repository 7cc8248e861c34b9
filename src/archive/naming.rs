//! Artifact naming
//!
//! Archived audio is stored as `audio_<identity>_<epochMillis>.<ext>`. The
//! name is the only place identity and creation time are recorded, so it has
//! to parse back exactly. Parsing is positional on `_`, which means an
//! identity containing `_` cannot be named at all; [`ArtifactName::new`]
//! rejects such identities instead of producing an ambiguous name.

use crate::room::Identity;
use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use thiserror::Error;

/// Leading field of every artifact name
pub const ARTIFACT_PREFIX: &str = "audio";

/// Separator between name fields
pub const FIELD_SEPARATOR: char = '_';

/// Default file extension for archived chunks
pub const DEFAULT_EXTENSION: &str = "webm";

/// Naming errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("identity is empty")]
    EmptyIdentity,

    #[error("identity {0:?} contains the field separator '_'")]
    SeparatorInIdentity(String),

    #[error("identity {0:?} contains a path separator")]
    PathInIdentity(String),

    #[error("extension {0:?} is not a plain file extension")]
    InvalidExtension(String),

    #[error("malformed artifact name {0:?}")]
    Malformed(String),
}

/// Parsed or synthesized artifact name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    identity: Identity,
    epoch_millis: i64,
    extension: String,
}

impl ArtifactName {
    /// Build a name, checking the identity precondition
    pub fn new(identity: Identity, epoch_millis: i64, extension: &str) -> Result<Self, NameError> {
        validate_identity(identity.as_str())?;
        validate_extension(extension)?;
        Ok(Self {
            identity,
            epoch_millis,
            extension: extension.to_string(),
        })
    }

    /// Parse a stored file name back into its fields
    pub fn parse(name: &str) -> Result<Self, NameError> {
        let malformed = || NameError::Malformed(name.to_string());

        let fields: Vec<&str> = name.split(FIELD_SEPARATOR).collect();
        let [prefix, identity, tail] = fields.as_slice() else {
            return Err(malformed());
        };
        if *prefix != ARTIFACT_PREFIX || identity.is_empty() {
            return Err(malformed());
        }

        let (millis, extension) = tail.split_once('.').ok_or_else(malformed)?;
        let epoch_millis: i64 = millis.parse().map_err(|_| malformed())?;
        if extension.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            identity: Identity::new(*identity),
            epoch_millis,
            extension: extension.to_string(),
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Human-readable creation time in the server's local zone
    pub fn display_timestamp(&self) -> String {
        display_timestamp(self.epoch_millis)
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{prefix}{sep}{identity}{sep}{millis}.{ext}",
            prefix = ARTIFACT_PREFIX,
            sep = FIELD_SEPARATOR,
            identity = self.identity,
            millis = self.epoch_millis,
            ext = self.extension,
        )
    }
}

/// Check that an identity can be embedded in an artifact name
pub fn validate_identity(identity: &str) -> Result<(), NameError> {
    if identity.is_empty() {
        return Err(NameError::EmptyIdentity);
    }
    if identity.contains(FIELD_SEPARATOR) {
        return Err(NameError::SeparatorInIdentity(identity.to_string()));
    }
    if identity.contains(['/', '\\', '\0']) {
        return Err(NameError::PathInIdentity(identity.to_string()));
    }
    Ok(())
}

/// Extensions are non-empty ASCII alphanumerics
pub fn validate_extension(extension: &str) -> Result<(), NameError> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NameError::InvalidExtension(extension.to_string()));
    }
    Ok(())
}

/// Format epoch milliseconds as local time, e.g. `11/14/2023, 10:13:20 PM`
pub fn display_timestamp(epoch_millis: i64) -> String {
    match Local.timestamp_millis_opt(epoch_millis).single() {
        Some(at) => format_display(&at),
        None => epoch_millis.to_string(),
    }
}

/// Format a timestamp in the `M/D/YYYY, h:mm:ss AM` style
pub fn format_display<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    #[test]
    fn test_name_for_alice() {
        let name = ArtifactName::new(Identity::new("alice"), 1_700_000_000_000, "webm").unwrap();
        assert_eq!(name.to_string(), "audio_alice_1700000000000.webm");
    }

    #[test]
    fn test_parse_alice() {
        let name = ArtifactName::parse("audio_alice_1700000000000.webm").unwrap();
        assert_eq!(name.identity(), &Identity::new("alice"));
        assert_eq!(name.epoch_millis(), 1_700_000_000_000);
        assert_eq!(name.extension(), "webm");
    }

    #[test]
    fn test_identity_with_separator_is_rejected() {
        let err = ArtifactName::new(Identity::new("mary_jane"), 1, "webm").unwrap_err();
        assert_eq!(err, NameError::SeparatorInIdentity("mary_jane".to_string()));
    }

    #[test]
    fn test_identity_with_path_is_rejected() {
        assert!(matches!(
            ArtifactName::new(Identity::new("../etc"), 1, "webm"),
            Err(NameError::PathInIdentity(_))
        ));
        assert_eq!(
            ArtifactName::new(Identity::new(""), 1, "webm"),
            Err(NameError::EmptyIdentity)
        );
    }

    #[test]
    fn test_bad_extension_is_rejected() {
        assert!(ArtifactName::new(Identity::new("alice"), 1, "").is_err());
        assert!(ArtifactName::new(Identity::new("alice"), 1, "we/bm").is_err());
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        for name in [
            ".gitkeep",
            "audio_alice.webm",
            "audio_alice_notanumber.webm",
            "audio_alice_123",
            "audio_alice_123.",
            "video_alice_123.webm",
            "audio__123.webm",
            "audio_mary_jane_123.webm",
        ] {
            assert!(ArtifactName::parse(name).is_err(), "{name} should not parse");
        }
    }

    #[test]
    fn test_identity_may_contain_dots() {
        let name = ArtifactName::new(Identity::new("a.b"), 42, "ogg").unwrap();
        let parsed = ArtifactName::parse(&name.to_string()).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn test_format_display_utc() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap();
        assert_eq!(format_display(&at), "11/14/2023, 10:13:20 PM");
    }

    proptest! {
        #[test]
        fn prop_name_round_trips(
            identity in "[A-Za-z0-9.@-]{1,24}",
            millis in any::<i64>(),
        ) {
            let name = ArtifactName::new(Identity::new(identity.clone()), millis, DEFAULT_EXTENSION).unwrap();
            let parsed = ArtifactName::parse(&name.to_string()).unwrap();
            prop_assert_eq!(parsed.identity().as_str(), identity.as_str());
            prop_assert_eq!(parsed.epoch_millis(), millis);
        }
    }
}
