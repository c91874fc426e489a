//! Notification sound value object

use std::fmt;

/// Sound names shipped with every macOS install
pub const COMMON_SYSTEM_SOUNDS: &[&str] = &[
    "Basso", "Blow", "Bottle", "Frog", "Funk", "Glass", "Hero", "Morse", "Ping", "Pop", "Purr",
    "Sosumi", "Submarine", "Tink",
];

/// Name of the platform default sound
pub const DEFAULT_SOUND: &str = "default";

/// A notification sound name.
///
/// Only constructed through [`crate::infrastructure::sound::SoundCatalog`]
/// validation or [`SoundName::default_sound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundName(String);

impl SoundName {
    pub fn default_sound() -> Self {
        Self(DEFAULT_SOUND.to_string())
    }

    /// Strip whitespace and a trailing `.aiff` extension
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();
        trimmed
            .strip_suffix(".aiff")
            .unwrap_or(trimmed)
            .to_string()
    }

    /// Wrap an already validated name
    pub(crate) fn from_validated(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.eq_ignore_ascii_case(DEFAULT_SOUND)
    }

    /// Whether the name is one of the well-known system sounds
    pub fn is_common(name: &str) -> bool {
        COMMON_SYSTEM_SOUNDS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_extension() {
        assert_eq!(SoundName::normalize(" Glass.aiff "), "Glass");
        assert_eq!(SoundName::normalize("Ping"), "Ping");
    }

    #[test]
    fn default_sound() {
        let sound = SoundName::default_sound();
        assert!(sound.is_default());
        assert_eq!(sound.to_string(), "default");
    }

    #[test]
    fn common_sounds_case_insensitive() {
        assert!(SoundName::is_common("glass"));
        assert!(SoundName::is_common("Submarine"));
        assert!(!SoundName::is_common("Trumpet"));
    }
}
