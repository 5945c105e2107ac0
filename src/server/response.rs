use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderName};
use tokio::io::{AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: Vec<(HeaderName, String)>,
    body: String,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    #[must_use]
    pub const fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    #[must_use]
    pub const fn not_found() -> Self {
        Self::with_status(StatusCode::NOT_FOUND)
    }

    /// Plain-text response with a `Content-Type: text/plain` header.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::new()
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body_text(&self) -> &str {
        &self.body
    }

    /// Serialise status line, headers and body. The connection is always
    /// announced as closing.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_str(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        for (name, value) in &self.headers {
            head.push_str(name.as_str());
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("content-length: ");
        head.push_str(&self.body.len().to_string());
        head.push_str("\r\nconnection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }

    /// Write the response and flush.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the peer has gone away.
    pub async fn write_to<S>(&self, socket: &mut S) -> std::io::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        socket.write_all(&self.to_bytes()).await?;
        socket.flush().await
    }
}
