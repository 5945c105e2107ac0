use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use http::{Method, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound for headers plus body of one request.
const MAX_REQUEST_BYTES: usize = 1024 * 1024;
const READ_CHUNK: usize = 1024;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub http_version: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Values captured by `:name` route segments.
    pub params: BTreeMap<String, String>,
}

impl HttpRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A request that could not be parsed, with the status to answer it with.
#[derive(Debug)]
pub struct RequestReject {
    pub status: StatusCode,
    pub message: String,
}

impl RequestReject {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

/// [`read_request`] bounded by `limit`; a peer that is too slow gets `408`.
///
/// # Errors
///
/// Returns a [`RequestReject`] when the deadline passes or the request is
/// rejected by [`read_request`].
pub async fn read_request_within<S>(
    socket: &mut S,
    limit: Duration,
) -> Result<HttpRequest, RequestReject>
where
    S: AsyncRead + Unpin,
{
    match tokio::time::timeout(limit, read_request(socket)).await {
        Ok(result) => result,
        Err(elapsed) => Err(RequestReject::new(
            StatusCode::REQUEST_TIMEOUT,
            format!("Request not received in time: {}", elapsed),
        )),
    }
}

/// Read a single request: headers up to the blank line, then
/// `Content-Length` bytes of body.
///
/// # Errors
///
/// Returns a [`RequestReject`] when the request is empty, malformed or
/// larger than the read limit.
pub async fn read_request<S>(socket: &mut S) -> Result<HttpRequest, RequestReject>
where
    S: AsyncRead + Unpin,
{
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let header_end;

    loop {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestReject::bad_request(format!("Failed to read request: {}", err)))?;
        if bytes == 0 {
            return Err(RequestReject::bad_request("Empty request"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestReject::bad_request("Invalid read length"))?;
        buffer.extend_from_slice(read_slice);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(RequestReject::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request too large",
            ));
        }
        if let Some(pos) = find_header_end(&buffer) {
            header_end = pos;
            break;
        }
    }

    let header_bytes = buffer
        .get(..header_end)
        .ok_or_else(|| RequestReject::bad_request("Malformed request headers"))?;
    let header_text = std::str::from_utf8(header_bytes).map_err(|err| {
        RequestReject::bad_request(format!("Invalid request encoding: {}", err))
    })?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| RequestReject::bad_request("Missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestReject::bad_request("Missing HTTP method"))?;
    let target = parts
        .next()
        .ok_or_else(|| RequestReject::bad_request("Missing request path"))?;
    let http_version = parts
        .next()
        .ok_or_else(|| RequestReject::bad_request("Missing HTTP version"))?;
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|err| RequestReject::bad_request(format!("Invalid HTTP method: {}", err)))?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(RequestReject::bad_request("Malformed header"));
        };
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    let content_length = headers
        .get("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        return Err(RequestReject::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    let body_start = header_end
        .checked_add(4)
        .ok_or_else(|| RequestReject::bad_request("Malformed request headers"))?;
    let mut body = buffer.get(body_start..).unwrap_or_default().to_vec();
    while body.len() < content_length {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestReject::bad_request(format!("Failed to read body: {}", err)))?;
        if bytes == 0 {
            return Err(RequestReject::bad_request("Body shorter than Content-Length"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestReject::bad_request("Invalid read length"))?;
        body.extend_from_slice(read_slice);
    }
    body.truncate(content_length);

    let (path, query) = split_target(target);

    Ok(HttpRequest {
        method,
        path: path.to_owned(),
        query,
        http_version: http_version.to_owned(),
        headers,
        body,
        params: BTreeMap::new(),
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Split `/path?a=1&b=2` into the path and its `key=value` pairs.
/// Pairs without `=` are dropped.
pub(super) fn split_target(target: &str) -> (&str, Vec<(String, String)>) {
    let Some((path, raw_query)) = target.split_once('?') else {
        return (target, Vec::new());
    };
    let query = raw_query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect();
    (path, query)
}
