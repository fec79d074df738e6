use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, HeaderMap, LAST_MODIFIED};
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, instrument};

use crate::result::{UpdaterError, UpdaterResult};

use super::client::create_probe_client;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/**
    Metadata about a remote file, as reported by the server.

    Either value may be missing if the server did not send
    the corresponding header, or sent it in an unexpected format.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteMetadata {
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl RemoteMetadata {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            size: parse_content_length(headers),
            last_modified: parse_last_modified(headers),
        }
    }

    /**
        Returns both the size and the last modification time.

        # Errors

        - If either value is missing.
    */
    pub fn require_size_and_date(&self, url: &str) -> UpdaterResult<(u64, DateTime<Utc>)> {
        let size = self.size.ok_or_else(|| UpdaterError::Metadata {
            url: url.to_string(),
            reason: "missing or malformed Content-Length header".to_string(),
        })?;
        let last_modified = self.last_modified.ok_or_else(|| UpdaterError::Metadata {
            url: url.to_string(),
            reason: "missing or malformed Last-Modified header".to_string(),
        })?;
        Ok((size, last_modified))
    }
}

/**
    Something that can look up metadata for a remote file without downloading it.
*/
pub trait MetadataProbe {
    /**
        Fetches metadata for the file at the given URL.

        # Errors

        - If the request failed or the server responded with an error status.
    */
    fn probe(&self, url: &str) -> impl Future<Output = UpdaterResult<RemoteMetadata>> + Send;
}

/**
    Probes remote files using HTTP `HEAD` requests.
*/
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: ClientWithMiddleware,
}

impl HttpProbe {
    /**
        Creates a new probe with its own unauthenticated client.

        The probe accepts both HTTP and HTTPS URLs.

        # Errors

        - If the HTTP client could not be created.
    */
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = create_probe_client()?;
        Ok(Self { client })
    }
}

impl MetadataProbe for HttpProbe {
    #[instrument(skip(self), level = "debug")]
    async fn probe(&self, url: &str) -> UpdaterResult<RemoteMetadata> {
        let to_metadata_error = |reason: String| UpdaterError::Metadata {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .head(url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| to_metadata_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| to_metadata_error(e.to_string()))?;

        let metadata = RemoteMetadata::from_headers(response.headers());
        debug!(?metadata, "probed remote file");

        Ok(metadata)
    }
}

fn parse_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn parse_last_modified(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let value = headers.get(LAST_MODIFIED)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;

    fn headers(pairs: &[(reqwest::header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn parses_both_headers() {
        let map = headers(&[
            (CONTENT_LENGTH, "104857600"),
            (LAST_MODIFIED, "Wed, 21 Oct 2015 07:28:00 GMT"),
        ]);
        let metadata = RemoteMetadata::from_headers(&map);
        assert_eq!(metadata.size, Some(104_857_600));
        assert_eq!(
            metadata.last_modified,
            Some(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap())
        );
        assert!(metadata.require_size_and_date("https://x").is_ok());
    }

    #[test]
    fn malformed_headers_are_missing() {
        let map = headers(&[
            (CONTENT_LENGTH, "lots"),
            (LAST_MODIFIED, "yesterday-ish"),
        ]);
        let metadata = RemoteMetadata::from_headers(&map);
        assert_eq!(metadata, RemoteMetadata::default());
    }

    /*
        Serves a single HEAD response over plain HTTP on a local port,
        returning the URL to request and the raw request that was received.
    */
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8(request).unwrap()
        });

        (format!("http://{addr}/YTLitePlus.ipa"), handle)
    }

    #[tokio::test]
    async fn http_probe_reads_size_of_compressed_plain_http_response() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Length: 104857600\r\n\
             Content-Encoding: gzip\r\n\
             Last-Modified: Wed, 21 Oct 2015 07:28:00 GMT\r\n\
             Connection: close\r\n\
             \r\n",
        )
        .await;

        let probe = HttpProbe::new().unwrap();
        let metadata = probe.probe(&url).await.unwrap();
        let request = server.await.unwrap().to_ascii_lowercase();

        assert!(request.starts_with("head "));
        assert!(!request.contains("gzip"));
        assert_eq!(metadata.size, Some(104_857_600));
        assert_eq!(
            metadata.last_modified,
            Some(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap())
        );
    }

    #[test]
    fn requiring_missing_values_is_a_metadata_error() {
        let only_size = RemoteMetadata {
            size: Some(10),
            last_modified: None,
        };
        assert!(matches!(
            only_size.require_size_and_date("https://x/a.ipa"),
            Err(UpdaterError::Metadata { url, .. }) if url == "https://x/a.ipa"
        ));
        assert!(matches!(
            RemoteMetadata::default().require_size_and_date("https://x/a.ipa"),
            Err(UpdaterError::Metadata { .. })
        ));
    }
}
