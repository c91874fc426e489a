//! System application activator
//!
//! Resolution order: bundle/desktop identifier, running process matched by
//! name, then well-known install locations.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::application::ports::{ActivationError, AppActivator};

/// Run a helper program with null stdio and report whether it succeeded
async fn run_quiet(program: &str, args: &[&str]) -> Result<bool, ActivationError> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ActivationError::ActivationFailed(format!("{} not found", program))
            } else {
                ActivationError::ActivationFailed(e.to_string())
            }
        })?;

    debug!(program, ?args, %status, "Activation helper finished");
    Ok(status.success())
}

/// Reverse-DNS identifier such as `com.apple.Safari` or `org.gnome.Nautilus`
pub fn is_bundle_identifier(target: &str) -> bool {
    let parts: Vec<&str> = target.split('.').collect();
    parts.len() >= 2
        && parts.iter().all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Default roots searched for installed applications
fn default_search_dirs() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        [
            "/Applications",
            "/Applications/Utilities",
            "/System/Applications",
            "/System/Applications/Utilities",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    } else {
        let mut dirs: Vec<PathBuf> = dirs::data_dir()
            .map(|d| d.join("applications"))
            .into_iter()
            .collect();
        dirs.extend(
            [
                "/usr/local/share/applications",
                "/usr/share/applications",
                "/var/lib/flatpak/exports/share/applications",
            ]
            .iter()
            .map(PathBuf::from),
        );
        dirs
    }
}

/// Activates applications with the platform's launcher tools.
pub struct SystemActivator {
    search_dirs: Vec<PathBuf>,
}

impl SystemActivator {
    /// Create an activator searching the platform's application directories
    pub fn new() -> Self {
        Self {
            search_dirs: default_search_dirs(),
        }
    }

    /// Search only the given directories
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Installed application bundle or desktop entry for a name or identifier
    fn probe(&self, name: &str) -> Option<PathBuf> {
        let candidates = if cfg!(target_os = "macos") {
            vec![format!("{}.app", name)]
        } else {
            let mut names = vec![format!("{}.desktop", name)];
            let lower = name.to_lowercase();
            if lower != name {
                names.push(format!("{}.desktop", lower));
            }
            names
        };

        self.search_dirs
            .iter()
            .flat_map(|dir| candidates.iter().map(move |c| dir.join(c)))
            .find(|path| path.exists())
    }

    /// Launch an installed application found by [`Self::probe`]
    async fn launch(&self, path: &Path) -> Result<bool, ActivationError> {
        if cfg!(target_os = "macos") {
            run_quiet("open", &[&path.to_string_lossy()]).await
        } else {
            let desktop_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    ActivationError::InvalidIdentifier(path.display().to_string())
                })?;
            run_quiet("gtk-launch", &[desktop_id]).await
        }
    }

    async fn activate_identifier(&self, identifier: &str) -> Result<bool, ActivationError> {
        if cfg!(target_os = "macos") {
            if run_quiet("open", &["-b", identifier]).await? {
                return Ok(true);
            }
            return Err(ActivationError::ApplicationNotFound(identifier.to_string()));
        }

        match self.probe(identifier) {
            Some(path) => self.launch(&path).await,
            None => Err(ActivationError::ApplicationNotFound(identifier.to_string())),
        }
    }

    /// Focus an already running application matched case-insensitively by name
    async fn activate_running(&self, name: &str) -> Result<Option<bool>, ActivationError> {
        let running = match run_quiet("pgrep", &["-i", "-x", name]).await {
            Ok(running) => running,
            Err(e) => {
                debug!(error = %e, "Process lookup unavailable");
                false
            }
        };
        if !running {
            return Ok(None);
        }

        if cfg!(target_os = "macos") {
            return run_quiet("open", &["-a", name]).await.map(Some);
        }

        if run_quiet("wmctrl", &["-x", "-a", name]).await.unwrap_or(false) {
            return Ok(Some(true));
        }
        run_quiet(
            "xdotool",
            &["search", "--onlyvisible", "--class", name, "windowactivate"],
        )
        .await
        .map(Some)
    }
}

impl Default for SystemActivator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppActivator for SystemActivator {
    async fn activate(&self, target: &str) -> Result<bool, ActivationError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ActivationError::InvalidIdentifier(
                "application identifier cannot be empty".to_string(),
            ));
        }

        if is_bundle_identifier(target) {
            match self.activate_identifier(target).await {
                Err(ActivationError::ApplicationNotFound(_)) => {
                    debug!(target, "Identifier not installed, trying as a name");
                }
                result => return result,
            }
        }

        if let Some(activated) = self.activate_running(target).await? {
            return Ok(activated);
        }

        match self.probe(target) {
            Some(path) => self.launch(&path).await,
            None => Err(ActivationError::ApplicationNotFound(target.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn recognizes_bundle_identifiers() {
        assert!(is_bundle_identifier("com.apple.Safari"));
        assert!(is_bundle_identifier("org.mozilla.firefox"));
        assert!(is_bundle_identifier("com.example.my-app"));
        assert!(!is_bundle_identifier("Safari"));
        assert!(!is_bundle_identifier("com..apple"));
        assert!(!is_bundle_identifier("Visual Studio Code"));
    }

    #[tokio::test]
    async fn empty_target_is_invalid() {
        let activator = SystemActivator::with_search_dirs(Vec::new());
        assert!(matches!(
            activator.activate("   ").await,
            Err(ActivationError::InvalidIdentifier(_))
        ));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn probe_finds_desktop_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("firefox.desktop"), "[Desktop Entry]").unwrap();
        let activator = SystemActivator::with_search_dirs(vec![dir.path().to_path_buf()]);

        assert_eq!(
            activator.probe("Firefox"),
            Some(dir.path().join("firefox.desktop"))
        );
        assert!(activator.probe("Thunderbird").is_none());
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn probe_finds_app_bundles() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("Notes.app")).unwrap();
        let activator = SystemActivator::with_search_dirs(vec![dir.path().to_path_buf()]);

        assert_eq!(activator.probe("Notes"), Some(dir.path().join("Notes.app")));
    }

    #[cfg(not(target_os = "macos"))]
    #[tokio::test]
    async fn unknown_application_is_not_found() {
        let dir = TempDir::new().unwrap();
        let activator = SystemActivator::with_search_dirs(vec![dir.path().to_path_buf()]);

        let result = activator
            .activate("org.example.definitely-not-installed-app")
            .await;
        assert!(matches!(
            result,
            Err(ActivationError::ApplicationNotFound(_))
        ));
    }
}
