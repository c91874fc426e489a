//! System sound catalog

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::SoundError;
use crate::domain::sound::{SoundName, COMMON_SYSTEM_SOUNDS, DEFAULT_SOUND};

/// Number of names listed in an invalid-sound error
const SUGGESTION_COUNT: usize = 5;

/// Looks up sound names in the platform sound directories
pub struct SoundCatalog {
    /// (directory, file extension)
    dirs: Vec<(PathBuf, &'static str)>,
}

impl SoundCatalog {
    /// Create a catalog over the macOS and freedesktop sound directories
    pub fn new() -> Self {
        Self {
            dirs: vec![
                (PathBuf::from("/System/Library/Sounds"), "aiff"),
                (PathBuf::from("/usr/share/sounds/freedesktop/stereo"), "oga"),
            ],
        }
    }

    /// Create with custom directories
    pub fn with_dirs(dirs: Vec<(PathBuf, &'static str)>) -> Self {
        Self { dirs }
    }

    fn file_exists(&self, name: &str) -> bool {
        self.dirs
            .iter()
            .any(|(dir, ext)| dir.join(format!("{}.{}", name, ext)).is_file())
    }

    /// Validate and normalize a user supplied sound name.
    /// Blank input means no sound.
    pub fn validate(&self, input: Option<&str>) -> Result<Option<SoundName>, SoundError> {
        let Some(raw) = input.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let name = SoundName::normalize(raw);

        if name.eq_ignore_ascii_case(DEFAULT_SOUND) {
            return Ok(Some(SoundName::default_sound()));
        }
        if SoundName::is_common(&name) || self.file_exists(&name) {
            return Ok(Some(SoundName::from_validated(name)));
        }

        let suggestions = self
            .available()
            .into_iter()
            .take(SUGGESTION_COUNT)
            .collect::<Vec<_>>()
            .join(", ");
        Err(SoundError::InvalidSound { name, suggestions })
    }

    /// All known sound names, `default` first
    pub fn available(&self) -> Vec<String> {
        let mut names: BTreeSet<String> =
            COMMON_SYSTEM_SOUNDS.iter().map(|s| s.to_string()).collect();

        for (dir, ext) in &self.dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(*ext) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.starts_with('.') {
                        names.insert(stem.to_string());
                    }
                }
            }
        }

        std::iter::once(DEFAULT_SOUND.to_string())
            .chain(names)
            .collect()
    }
}

impl Default for SoundCatalog {
    fn default() -> Self {
        Self::new()
    }
}
