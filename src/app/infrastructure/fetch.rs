use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::app::domain::settings::Settings;
use crate::app::infrastructure::error::FetchError;

/// Raw bytes of an external asset plus the MIME type they were served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FetchedAsset {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Resolves an external source (URL or path) to bytes.
pub trait AssetFetcher {
    fn fetch(&self, source: &str) -> Result<FetchedAsset, FetchError>;
}

/// Blocking fetcher: `http(s)://` through minreq, everything else from disk.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    timeout_secs: u64,
    user_agent: String,
}

impl DefaultFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            timeout_secs: settings.fetch_timeout_secs,
            user_agent: settings.user_agent.clone(),
        }
    }

    fn fetch_http(&self, url: &str) -> Result<FetchedAsset, FetchError> {
        let response = minreq::get(url)
            .with_header("User-Agent", &self.user_agent)
            .with_timeout(self.timeout_secs)
            .send()?;

        if !(200..300).contains(&response.status_code) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status_code,
            });
        }

        let mime = response
            .headers
            .get("content-type")
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| mime_from_extension(url).to_string());

        Ok(FetchedAsset {
            bytes: response.into_bytes(),
            mime,
        })
    }

    fn fetch_file(&self, path: &str) -> Result<FetchedAsset, FetchError> {
        let bytes = fs::read(path)?;
        Ok(FetchedAsset {
            bytes,
            mime: mime_from_extension(path).to_string(),
        })
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AssetFetcher for DefaultFetcher {
    fn fetch(&self, source: &str) -> Result<FetchedAsset, FetchError> {
        log::info!("fetching {}", source);
        if source.starts_with("http://") || source.starts_with("https://") {
            self.fetch_http(source)
        } else if let Some(path) = source.strip_prefix("file://") {
            self.fetch_file(path)
        } else if source.contains("://") {
            Err(FetchError::UnsupportedSource(source.to_string()))
        } else {
            self.fetch_file(source)
        }
    }
}

/// MIME type guessed from a path or URL's extension.
pub fn mime_from_extension(source: &str) -> &'static str {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("cat.PNG"), "image/png");
        assert_eq!(mime_from_extension("https://x.test/a.jpeg?size=2"), "image/jpeg");
        assert_eq!(mime_from_extension("/fonts/Lato.ttf"), "font/ttf");
        assert_eq!(mime_from_extension("README"), "application/octet-stream");
    }

    #[test]
    fn test_data_uri_encoding() {
        let asset = FetchedAsset {
            bytes: b"hello".to_vec(),
            mime: "image/png".to_string(),
        };
        assert_eq!(asset.to_data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_fetch_local_file() {
        let mut file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        file.write_all(b"GIF89a").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let fetched = DefaultFetcher::default().fetch(&path).unwrap();
        assert_eq!(fetched.bytes, b"GIF89a");
        assert_eq!(fetched.mime, "image/gif");

        let fetched = DefaultFetcher::default()
            .fetch(&format!("file://{}", path))
            .unwrap();
        assert_eq!(fetched.bytes, b"GIF89a");
    }

    #[test]
    fn test_fetch_missing_file() {
        let err = DefaultFetcher::default()
            .fetch("/definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = DefaultFetcher::default().fetch("ftp://x.test/a.png").unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedSource(_)));
    }
}
