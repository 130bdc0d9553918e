//! Byte-range fetching trait and the HTTP implementation.
//!
//! The [`RangeFetcher`] trait is the only way the prober and the scanner
//! touch the network. Production code uses [`HttpFetcher`]; tests use the
//! recording `MockFetcher` in this module's test submodule.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    /// The server answered with an error status. `body` is the response
    /// body, capped like a successful one.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: Vec<u8>,
    },
    #[error("Fetch failed: {0}")]
    Failed(String),
}

/// Which prefix of a resource to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// Bytes `[0, n)`.
    Prefix(usize),
    /// The whole resource.
    Full,
}

impl ByteRange {
    /// Value for an HTTP `Range` header (`bytes=0-4999`, `bytes=0-`).
    pub fn header_value(&self) -> String {
        match self {
            ByteRange::Prefix(n) => format!("bytes=0-{}", n.saturating_sub(1)),
            ByteRange::Full => "bytes=0-".to_string(),
        }
    }

    /// Clamp a buffer to the requested range.
    pub fn limit(&self) -> Option<usize> {
        match self {
            ByteRange::Prefix(n) => Some(*n),
            ByteRange::Full => None,
        }
    }
}

/// Trait for byte-range transports.
///
/// Implementations must return at most the requested prefix. Returning fewer
/// bytes than requested is fine and simply means the resource is shorter.
pub trait RangeFetcher: Sync {
    fn fetch_range(&self, resource: &str, range: ByteRange) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher sending `Range` requests through a shared agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl RangeFetcher for HttpFetcher {
    fn fetch_range(&self, url: &str, range: ByteRange) -> Result<Vec<u8>, FetchError> {
        let request = self.agent.get(url).set("Range", &range.header_value());
        let (response, error_status) = match request.call() {
            Ok(response) => (response, None),
            // ureq treats 4xx/5xx as errors but still hands over the response.
            Err(ureq::Error::Status(status, response)) => (response, Some(status)),
            Err(source) => {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    source: Box::new(source),
                });
            }
        };

        let body = read_capped(response, range)?;
        match error_status {
            Some(status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
                body,
            }),
            None => Ok(body),
        }
    }
}

/// Servers that ignore Range send the whole body; only keep the prefix.
fn read_capped(response: ureq::Response, range: ByteRange) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    match range.limit() {
        Some(n) => {
            response.into_reader().take(n as u64).read_to_end(&mut body)?;
        }
        None => {
            response.into_reader().read_to_end(&mut body)?;
        }
    }
    Ok(body)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::thread;

    /// In-memory fetcher serving fixed byte buffers. Requests are logged
    /// behind a Mutex so one instance can be shared by rayon workers.
    #[derive(Default)]
    pub struct MockFetcher {
        pub resources: HashMap<String, Vec<u8>>,
        pub statuses: HashMap<String, u16>,
        pub requests: Mutex<Vec<(String, ByteRange)>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_resource(mut self, resource: &str, bytes: Vec<u8>) -> Self {
            self.resources.insert(resource.to_string(), bytes);
            self
        }

        /// Serve `body` with an HTTP error status, like a missing scan.
        pub fn with_error_status(mut self, resource: &str, status: u16, body: &[u8]) -> Self {
            self.statuses.insert(resource.to_string(), status);
            self.with_resource(resource, body.to_vec())
        }

        pub fn get_requests(&self) -> Vec<(String, ByteRange)> {
            self.requests.lock().unwrap().clone()
        }

        /// Requested ranges for one resource, in call order.
        pub fn ranges_for(&self, resource: &str) -> Vec<ByteRange> {
            self.get_requests()
                .into_iter()
                .filter(|(r, _)| r == resource)
                .map(|(_, range)| range)
                .collect()
        }
    }

    impl RangeFetcher for MockFetcher {
        fn fetch_range(&self, resource: &str, range: ByteRange) -> Result<Vec<u8>, FetchError> {
            self.requests
                .lock()
                .unwrap()
                .push((resource.to_string(), range));

            let bytes = self
                .resources
                .get(resource)
                .ok_or_else(|| FetchError::Failed(format!("404 for {resource}")))?;
            let end = range.limit().map_or(bytes.len(), |n| n.min(bytes.len()));
            let body = bytes[..end].to_vec();
            match self.statuses.get(resource) {
                Some(&status) => Err(FetchError::Status {
                    url: resource.to_string(),
                    status,
                    body,
                }),
                None => Ok(body),
            }
        }
    }

    /// Answer exactly one HTTP request on a local port with a fixed response.
    /// Returns the URL to request.
    pub fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            // The client may hang up once it has the prefix it asked for.
            let _ = stream.write_all(&body);
        });
        format!("http://{addr}/HLSL_NUR_00001001.jpg")
    }

    #[test]
    fn header_value_for_prefix_is_inclusive() {
        assert_eq!(ByteRange::Prefix(5000).header_value(), "bytes=0-4999");
    }

    #[test]
    fn header_value_for_full() {
        assert_eq!(ByteRange::Full.header_value(), "bytes=0-");
    }

    #[test]
    fn mock_serves_prefix_and_records_request() {
        let fetcher = MockFetcher::new().with_resource("a.jpg", vec![1, 2, 3, 4]);

        let bytes = fetcher.fetch_range("a.jpg", ByteRange::Prefix(2)).unwrap();
        assert_eq!(bytes, vec![1, 2]);

        let bytes = fetcher.fetch_range("a.jpg", ByteRange::Full).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);

        assert_eq!(
            fetcher.ranges_for("a.jpg"),
            vec![ByteRange::Prefix(2), ByteRange::Full]
        );
    }

    #[test]
    fn http_error_status_keeps_body() {
        let url = serve_once("404 Not Found", b"<html>Not Found</html>".to_vec());
        let fetcher = HttpFetcher::new(Duration::from_secs(5));

        match fetcher.fetch_range(&url, ByteRange::Prefix(5000)) {
            Err(FetchError::Status { status, body, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(body, b"<html>Not Found</html>");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn http_body_is_capped_to_prefix() {
        let url = serve_once("200 OK", vec![7u8; 100]);
        let fetcher = HttpFetcher::new(Duration::from_secs(5));

        let body = fetcher.fetch_range(&url, ByteRange::Prefix(10)).unwrap();
        assert_eq!(body, vec![7u8; 10]);
    }

    #[test]
    fn mock_error_status_carries_body() {
        let fetcher = MockFetcher::new().with_error_status("gone.jpg", 404, b"gone");
        assert!(matches!(
            fetcher.fetch_range("gone.jpg", ByteRange::Prefix(2)),
            Err(FetchError::Status { status: 404, ref body, .. }) if body == b"go"
        ));
    }

    #[test]
    fn mock_missing_resource_is_error() {
        let fetcher = MockFetcher::new();
        assert!(matches!(
            fetcher.fetch_range("missing.jpg", ByteRange::Full),
            Err(FetchError::Failed(_))
        ));
        assert_eq!(fetcher.get_requests().len(), 1);
    }
}
