//! Notification image resolver
//!
//! Remote images are downloaded into the temp dir; local references are
//! checked for existence and a supported image extension.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::application::ports::{ImageError, ImageResolver};

/// Extensions accepted for local images
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "tiff", "tif", "bmp", "ico", "icns", "svg",
];

/// Extension used when a downloaded image URL has none
const FALLBACK_EXTENSION: &str = "png";

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if path == "~" {
        home()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home().join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Check that a local path is an existing image file
pub fn validate_local_image(path: &Path) -> Result<(), ImageError> {
    let display = path.display().to_string();

    let metadata = std::fs::metadata(path).map_err(|_| ImageError::NotFound(display.clone()))?;
    if metadata.is_dir() {
        return Err(ImageError::IsDirectory(display));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageError::UnsupportedFormat {
            path: display,
            extension,
        });
    }

    Ok(())
}

/// Resolves image references using reqwest for remote files
pub struct SystemImageResolver {
    client: reqwest::Client,
    download_dir: PathBuf,
}

impl SystemImageResolver {
    /// Create a resolver downloading into the system temp dir
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            download_dir: std::env::temp_dir(),
        }
    }

    /// Download into a custom directory
    pub fn with_download_dir(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            download_dir: download_dir.into(),
        }
    }

    fn download_extension(url: &Url) -> String {
        Path::new(url.path())
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(FALLBACK_EXTENSION)
            .to_lowercase()
    }

    async fn download(&self, url: Url) -> Result<PathBuf, ImageError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::DownloadFailed(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ImageError::DownloadFailed("empty response".to_string()));
        }

        let path = self.download_dir.join(format!(
            "smart-notify-{}.{}",
            Uuid::new_v4().simple(),
            Self::download_extension(&url)
        ));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))?;

        debug!(%url, path = %path.display(), size = bytes.len(), "Downloaded image");
        Ok(path)
    }
}

impl Default for SystemImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageResolver for SystemImageResolver {
    async fn resolve(&self, reference: &str) -> Result<PathBuf, ImageError> {
        let reference = reference.trim();

        if reference.starts_with("http://") || reference.starts_with("https://") {
            let url = Url::parse(reference)
                .map_err(|e| ImageError::DownloadFailed(format!("{}: {}", reference, e)))?;
            return self.download(url).await;
        }

        let path = if reference.starts_with("file://") {
            Url::parse(reference)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| ImageError::NotFound(reference.to_string()))?
        } else {
            expand_tilde(reference)
        };

        validate_local_image(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn tilde_expansion() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde("~/pic.png"), home.join("pic.png"));
        assert_eq!(expand_tilde("/abs/pic.png"), PathBuf::from("/abs/pic.png"));
        assert_eq!(expand_tilde("rel~/pic.png"), PathBuf::from("rel~/pic.png"));
    }

    #[tokio::test]
    async fn local_image_resolves() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("logo.PNG");
        std::fs::write(&image, b"\x89PNG").unwrap();

        let resolver = SystemImageResolver::with_download_dir(dir.path());
        let resolved = resolver.resolve(image.to_str().unwrap()).await.unwrap();
        assert_eq!(resolved, image);
    }

    #[tokio::test]
    async fn file_url_resolves() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("logo.jpg");
        std::fs::write(&image, b"jpg").unwrap();
        let url = Url::from_file_path(&image).unwrap();

        let resolver = SystemImageResolver::with_download_dir(dir.path());
        assert_eq!(resolver.resolve(url.as_str()).await.unwrap(), image);
    }

    #[tokio::test]
    async fn local_errors() {
        let dir = TempDir::new().unwrap();
        let resolver = SystemImageResolver::with_download_dir(dir.path());

        let missing = dir.path().join("missing.png");
        assert!(matches!(
            resolver.resolve(missing.to_str().unwrap()).await,
            Err(ImageError::NotFound(_))
        ));

        assert!(matches!(
            resolver.resolve(dir.path().to_str().unwrap()).await,
            Err(ImageError::IsDirectory(_))
        ));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hi").unwrap();
        let err = resolver.resolve(text.to_str().unwrap()).await.unwrap_err();
        assert_eq!(
            err,
            ImageError::UnsupportedFormat {
                path: text.display().to_string(),
                extension: "txt".to_string()
            }
        );
        assert!(!err.is_remote());
    }

    #[tokio::test]
    async fn remote_image_is_downloaded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/avatar.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let resolver = SystemImageResolver::with_download_dir(dir.path());
        let resolved = resolver
            .resolve(&format!("{}/images/avatar.jpg", server.uri()))
            .await
            .unwrap();

        assert_eq!(resolved.parent().unwrap(), dir.path());
        assert_eq!(resolved.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(&resolved).unwrap(), b"jpegdata");
    }

    #[tokio::test]
    async fn remote_without_extension_defaults_to_png() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/avatar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let resolver = SystemImageResolver::with_download_dir(dir.path());
        let resolved = resolver
            .resolve(&format!("{}/avatar", server.uri()))
            .await
            .unwrap();
        assert_eq!(resolved.extension().unwrap(), "png");
    }

    #[tokio::test]
    async fn remote_http_error_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resolver = SystemImageResolver::new();
        let err = resolver
            .resolve(&format!("{}/missing.png", server.uri()))
            .await
            .unwrap_err();
        assert!(err.is_remote());
    }
}
