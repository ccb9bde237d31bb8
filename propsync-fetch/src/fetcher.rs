use crate::AttachmentSource;
use crate::data_uri::DataUri;
use crate::error::{FetchError, FetchResult};
use propsync_model::AttachmentReference;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Settings for [`UriFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    /// `None` lets a slow server block the pass indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("propsync/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }
}

/// Resolves `http`, `https`, `file` and `data` URIs to bytes.
///
/// Holds a blocking HTTP client, so it must be created, used and dropped
/// outside of an async runtime context.
pub struct UriFetcher {
    client: reqwest::blocking::Client,
}

impl UriFetcher {
    pub fn new(config: FetcherConfig) -> FetchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    fn fetch_http(&self, uri: &Url) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(uri.clone())
            .send()
            .map_err(|e| FetchError::Http {
                uri: uri.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http {
                uri: uri.to_string(),
                message: format!("read body: {e}"),
            })
    }

    fn fetch_file(&self, uri: &Url) -> FetchResult<Vec<u8>> {
        let path = uri
            .to_file_path()
            .map_err(|()| FetchError::InvalidFilePath(uri.to_string()))?;
        std::fs::read(&path).map_err(|source| FetchError::Io { path, source })
    }

    fn fetch_data(&self, uri: &Url) -> FetchResult<Vec<u8>> {
        let mut without_fragment = uri.clone();
        without_fragment.set_fragment(None);
        DataUri::parse(without_fragment.as_str())?.decode()
    }
}

impl AttachmentSource for UriFetcher {
    fn fetch(&self, uri: &Url, target: &AttachmentReference) -> FetchResult<Vec<u8>> {
        let scheme = uri.scheme();
        debug!(uri = %uri, attachment = %target, scheme, "Fetching attachment content");

        let bytes = if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
            self.fetch_http(uri)?
        } else if scheme.eq_ignore_ascii_case("file") {
            self.fetch_file(uri)?
        } else if scheme.eq_ignore_ascii_case("data") {
            self.fetch_data(uri)?
        } else {
            return Err(FetchError::UnsupportedScheme {
                scheme: scheme.to_string(),
                uri: uri.to_string(),
            });
        };

        debug!(uri = %uri, attachment = %target, size_bytes = bytes.len(), "Fetched attachment content");
        Ok(bytes)
    }
}
