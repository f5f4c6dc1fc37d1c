//! Fetching raw document bytes.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;

/// Where a document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Remote(Url),
    Local(PathBuf),
}

impl Locator {
    /// Absolute http(s) URLs are remote. Anything else is joined onto `base`
    /// when one is given, or treated as a filesystem path.
    pub fn resolve(raw: &str, base: Option<&Url>) -> Result<Self, FetchError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FetchError::InvalidLocator("empty locator".to_string()));
        }

        if let Ok(url) = Url::parse(raw) {
            return match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::Local)
                    .map_err(|()| FetchError::InvalidLocator(raw.to_string())),
                // Windows drive letters parse as a one-letter scheme.
                scheme if scheme.len() == 1 => Ok(Self::Local(PathBuf::from(raw))),
                other => Err(FetchError::InvalidLocator(format!(
                    "unsupported scheme {other:?} in {raw}"
                ))),
            };
        }

        match base {
            Some(base) => base
                .join(raw)
                .map(Self::Remote)
                .map_err(|e| FetchError::InvalidLocator(format!("{raw}: {e}"))),
            None => Ok(Self::Local(PathBuf::from(raw))),
        }
    }

    /// Last path segment, used as the saved file name.
    pub fn file_name(&self) -> String {
        let name = match self {
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(str::to_string),
            Self::Local(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string),
        };
        name.filter(|n| !n.is_empty())
            .unwrap_or_else(|| "document.pdf".to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, FetchError>;
}

/// Loads remote locators over HTTP and local ones from disk.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    client: reqwest::Client,
}

impl AssetLoader {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl DocumentLoader for AssetLoader {
    async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
        match locator {
            Locator::Remote(url) => {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                    });
                }
                let bytes = response.bytes().await?;
                debug!(%url, len = bytes.len(), "downloaded");
                Ok(bytes.to_vec())
            }
            Locator::Local(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absolute_urls_are_remote() {
        let locator = Locator::resolve("https://example.com/assets/pdf/cv.pdf", None).unwrap();
        assert!(matches!(locator, Locator::Remote(_)));
        assert_eq!(locator.file_name(), "cv.pdf");
    }

    #[test]
    fn relative_locators_join_the_base_url() {
        let base = Url::parse("https://portfolio.example/").unwrap();
        let locator = Locator::resolve("assets/pdf/thesis.pdf", Some(&base)).unwrap();
        assert_eq!(
            locator,
            Locator::Remote(Url::parse("https://portfolio.example/assets/pdf/thesis.pdf").unwrap())
        );
    }

    #[test]
    fn relative_locators_without_base_are_paths() {
        let locator = Locator::resolve("assets/pdf/thesis.pdf", None).unwrap();
        assert_eq!(locator, Locator::Local(PathBuf::from("assets/pdf/thesis.pdf")));
        assert_eq!(locator.file_name(), "thesis.pdf");
        assert_eq!(locator.to_string(), "assets/pdf/thesis.pdf");
    }

    #[test]
    fn rejects_empty_and_unsupported_locators() {
        assert!(matches!(
            Locator::resolve("  ", None),
            Err(FetchError::InvalidLocator(_))
        ));
        assert!(matches!(
            Locator::resolve("ftp://example.com/cv.pdf", None),
            Err(FetchError::InvalidLocator(_))
        ));
    }

    #[test]
    fn file_name_falls_back_for_bare_hosts() {
        let locator = Locator::resolve("https://example.com/", None).unwrap();
        assert_eq!(locator.file_name(), "document.pdf");
    }

    #[tokio::test]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let loader = AssetLoader::new(None).unwrap();
        let bytes = loader.fetch(&Locator::Local(path)).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn missing_local_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = AssetLoader::new(None).unwrap();
        let err = loader
            .fetch(&Locator::Local(dir.path().join("missing.pdf")))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
