//! HTTP client for streaming remote reads.

use futures::StreamExt;
use promread_types::{Filter, Query, TimeSeries};
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::response::decode_read_response;
use crate::url::{health_url, normalize_addr, read_url, redacted};
use crate::{
    BoxError, BufferPool, DEFAULT_MAX_FRAME_SIZE, FrameError, FrameReader, PROTOBUF_CONTENT_TYPE,
    READ_VERSION, READ_VERSION_HEADER, ReadError, decode_chunked_series, encode_read_request,
};

/// Default timeout for a single read attempt.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Most bytes of an error response kept for diagnostics.
const MAX_ERROR_BODY: usize = 4096;

/// Process-wide scratch buffers for response bodies.
static BODY_BUFFER_POOL: BufferPool = BufferPool::new();

/// Configuration for the remote-read client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the remote source. Required.
    pub addr: String,
    /// Timeout for one attempt, including reading the body.
    pub read_timeout: Duration,
    /// Basic-auth username. Credentials are sent only when this is set.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Attempts per read before giving up.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Largest accepted response frame, in bytes.
    pub max_frame_size: usize,
    /// Skip series entries already delivered by a failed attempt.
    pub resume_on_retry: bool,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: String::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            username: None,
            password: None,
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            resume_on_retry: true,
            user_agent: format!("promread/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration for the given address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Client for reading series from a remote-read endpoint.
///
/// The client is immutable after construction and can be shared by
/// concurrent reads; each read owns its request, response, and buffers.
#[derive(Debug, Clone)]
pub struct RemoteReadClient {
    client: Client,
    health: Client,
    addr: String,
    config: ClientConfig,
}

impl RemoteReadClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, `max_attempts` is zero, or
    /// the HTTP client cannot be created.
    pub fn new(mut config: ClientConfig) -> Result<Self, ReadError> {
        let addr = normalize_addr(&config.addr).to_string();
        if addr.is_empty() {
            return Err(ReadError::Config("addr can't be empty".to_string()));
        }
        if config.max_attempts == 0 {
            return Err(ReadError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if config.read_timeout.is_zero() {
            config.read_timeout = DEFAULT_READ_TIMEOUT;
        }
        config.addr.clone_from(&addr);

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.read_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;
        // Health checks use their own client without the read timeout.
        let health = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            health,
            addr,
            config,
        })
    }

    /// Creates a client with default configuration for the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty or the HTTP client cannot be
    /// created.
    pub fn with_addr(addr: impl Into<String>) -> Result<Self, ReadError> {
        Self::new(ClientConfig::new(addr))
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the normalized base address.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Streams every series matching `filter` to `callback`.
    ///
    /// The callback is invoked once per series entry, in stream order. Failed
    /// attempts are retried after `retry_delay`, up to `max_attempts`.
    /// Callback errors fail the attempt like any other error. With
    /// `resume_on_retry` set, a retry skips entries an earlier attempt
    /// already delivered; otherwise they are delivered again.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Query`] if the filter is invalid,
    /// [`ReadError::Stopped`] if `cancel` fires, and
    /// [`ReadError::AttemptsExhausted`] if every attempt fails.
    pub async fn read<F>(
        &self,
        cancel: &CancellationToken,
        filter: &Filter,
        mut callback: F,
    ) -> Result<(), ReadError>
    where
        F: FnMut(TimeSeries) -> Result<(), BoxError>,
    {
        let query = Query::from_filter(filter)?;
        let request = encode_read_request(&query)?;
        debug!(%query, bytes = request.len(), "prepared remote read request");

        let mut delivered = 0u64;
        let mut attempt = 1;
        loop {
            if !self.config.resume_on_retry {
                delivered = 0;
            }
            let mut delivery = Delivery {
                delivered: &mut delivered,
                position: 0,
                callback: &mut callback,
            };
            match self.fetch(cancel, &request, &mut delivery).await {
                Ok(()) => return Ok(()),
                Err(ReadError::Canceled) => return Err(ReadError::Stopped),
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %err,
                        "attempt to fetch data from remote storage failed"
                    );
                    if attempt >= self.config.max_attempts {
                        return Err(ReadError::AttemptsExhausted {
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ReadError::Stopped),
                        () = tokio::time::sleep(self.config.retry_delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Checks the health endpoint of the remote source.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Unhealthy`] unless the endpoint answers 200.
    pub async fn ping(&self) -> Result<(), ReadError> {
        let url = health_url(&self.addr);
        let response = self.authorize(self.health.get(&url)).send().await?;
        let status = response.status();
        debug!(url = %redacted(&url), status = status.as_u16(), "health check");
        if status != StatusCode::OK {
            return Err(ReadError::Unhealthy {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(username) if !username.is_empty() => {
                builder.basic_auth(username, self.config.password.as_deref())
            }
            _ => builder,
        }
    }

    /// Performs one attempt.
    async fn fetch<F>(
        &self,
        cancel: &CancellationToken,
        request: &bytes::Bytes,
        delivery: &mut Delivery<'_, F>,
    ) -> Result<(), ReadError>
    where
        F: FnMut(TimeSeries) -> Result<(), BoxError>,
    {
        let url = read_url(&self.addr);
        let builder = self
            .client
            .post(&url)
            .header(CONTENT_ENCODING, "snappy")
            .header(ACCEPT_ENCODING, "snappy")
            .header(CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)
            .header(READ_VERSION_HEADER, READ_VERSION)
            .body(request.clone());

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ReadError::Canceled),
            response = self.authorize(builder).send() => {
                response.map_err(|source| ReadError::Transport {
                    url: redacted(&url),
                    len: request.len(),
                    source,
                })?
            }
        };

        let status = response.status();
        debug!(url = %redacted(&url), status = status.as_u16(), "remote read response");
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            let body = error_body(cancel, response).await?;
            return Err(ReadError::UnexpectedStatus {
                status: status.as_u16(),
                url: redacted(&url),
                body,
            });
        }

        if is_sampled(&response) {
            self.read_sampled(cancel, response, delivery).await
        } else {
            self.read_streamed(cancel, response, delivery).await
        }
    }

    /// Decodes a framed response frame by frame.
    async fn read_streamed<F>(
        &self,
        cancel: &CancellationToken,
        response: Response,
        delivery: &mut Delivery<'_, F>,
    ) -> Result<(), ReadError>
    where
        F: FnMut(TimeSeries) -> Result<(), BoxError>,
    {
        let mut frames = FrameReader::new(
            Box::pin(response.bytes_stream()),
            self.config.max_frame_size,
            BODY_BUFFER_POOL.get(),
        );

        let mut count = 0usize;
        loop {
            let frame = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ReadError::Canceled),
                frame = frames.next_frame() => frame?,
            };
            let Some(frame) = frame else {
                break;
            };
            count += 1;

            for series in frame.chunked_series {
                if delivery.already_delivered() {
                    continue;
                }
                delivery.deliver(decode_chunked_series(series)?)?;
            }
        }

        debug!(frames = count, "remote read stream finished");
        Ok(())
    }

    /// Decodes a single snappy-compressed response.
    async fn read_sampled<F>(
        &self,
        cancel: &CancellationToken,
        response: Response,
        delivery: &mut Delivery<'_, F>,
    ) -> Result<(), ReadError>
    where
        F: FnMut(TimeSeries) -> Result<(), BoxError>,
    {
        let limit = self.config.max_frame_size;
        let mut body = BODY_BUFFER_POOL.get();
        let mut stream = Box::pin(response.bytes_stream());
        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ReadError::Canceled),
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else {
                break;
            };
            let chunk = chunk.map_err(|e| FrameError::Body(e.into()))?;
            let size = body.len() + chunk.len();
            if size > limit {
                return Err(FrameError::TooLarge {
                    size: size as u64,
                    limit,
                }
                .into());
            }
            body.extend_from_slice(&chunk);
        }

        let response = decode_read_response(&body)?;
        debug!(
            results = response.results.len(),
            "remote read sampled response"
        );
        for result in response.results {
            for series in result.timeseries {
                if delivery.already_delivered() {
                    continue;
                }
                delivery.deliver(series.into())?;
            }
        }
        Ok(())
    }
}

/// Reads the start of an error response body.
///
/// Stops after [`MAX_ERROR_BODY`] bytes. A failed read keeps what arrived
/// before it and notes the failure in the returned text.
async fn error_body(cancel: &CancellationToken, response: Response) -> Result<String, ReadError> {
    let mut body = Vec::new();
    let mut failure = None;
    let mut stream = Box::pin(response.bytes_stream());
    while body.len() < MAX_ERROR_BODY {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ReadError::Canceled),
            chunk = stream.next() => chunk,
        };
        match chunk {
            Some(Ok(chunk)) => {
                let take = chunk.len().min(MAX_ERROR_BODY - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            Some(Err(e)) => {
                warn!(error = %e, "failed to read error response body");
                failure = Some(e);
                break;
            }
            None => break,
        }
    }

    let mut text = String::from_utf8_lossy(&body).into_owned();
    if let Some(e) = failure {
        text.push_str(&format!(" (body read failed: {e})"));
    }
    Ok(text)
}

/// Returns true if the server chose the non-streamed response type.
fn is_sampled(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(PROTOBUF_CONTENT_TYPE))
}

/// Hands series to the callback and tracks how many were delivered.
struct Delivery<'a, F> {
    /// Entries delivered by this read so far, across attempts.
    delivered: &'a mut u64,
    /// Entries seen by the current attempt.
    position: u64,
    callback: &'a mut F,
}

impl<F> Delivery<'_, F>
where
    F: FnMut(TimeSeries) -> Result<(), BoxError>,
{
    /// Advances past the next entry, returning true if it was already
    /// delivered by an earlier attempt.
    fn already_delivered(&mut self) -> bool {
        self.position += 1;
        self.position <= *self.delivered
    }

    fn deliver(&mut self, series: TimeSeries) -> Result<(), ReadError> {
        trace!(%series, samples = series.len(), "delivering series");
        (self.callback)(series).map_err(ReadError::Callback)?;
        *self.delivered = self.position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.max_frame_size, 50_000_000);
        assert!(config.resume_on_retry);
        assert!(config.username.is_none());
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = RemoteReadClient::with_addr("http://localhost:9090/").unwrap();
        assert_eq!(client.addr(), "http://localhost:9090");
        assert_eq!(client.config().addr, "http://localhost:9090");
    }

    #[tokio::test]
    async fn test_missing_addr() {
        assert!(matches!(
            RemoteReadClient::new(ClientConfig::default()),
            Err(ReadError::Config(_))
        ));
        assert!(matches!(
            RemoteReadClient::with_addr("/"),
            Err(ReadError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected() {
        let config = ClientConfig {
            max_attempts: 0,
            ..ClientConfig::new("http://localhost:9090")
        };
        assert!(matches!(
            RemoteReadClient::new(config),
            Err(ReadError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_timeout_uses_default() {
        let config = ClientConfig {
            read_timeout: Duration::ZERO,
            ..ClientConfig::new("http://localhost:9090")
        };
        let client = RemoteReadClient::new(config).unwrap();
        assert_eq!(client.config().read_timeout, DEFAULT_READ_TIMEOUT);
    }

    #[tokio::test]
    async fn test_invalid_filter_fails_before_sending() {
        // Nothing listens on this address; a request would fail differently.
        let client = RemoteReadClient::with_addr("http://127.0.0.1:9").unwrap();
        let filter = Filter::new(0, 1000).with_label("", "node");
        let result = client
            .read(&CancellationToken::new(), &filter, |_| Ok(()))
            .await;
        assert!(matches!(result, Err(ReadError::Query(_))));
    }

    #[test]
    fn test_delivery_skips_delivered_entries() {
        let mut delivered = 2u64;
        let mut seen = Vec::new();
        let mut callback = |series: TimeSeries| -> Result<(), BoxError> {
            seen.push(series.len());
            Ok(())
        };
        let mut delivery = Delivery {
            delivered: &mut delivered,
            position: 0,
            callback: &mut callback,
        };

        assert!(delivery.already_delivered());
        assert!(delivery.already_delivered());
        assert!(!delivery.already_delivered());
        delivery.deliver(TimeSeries::default()).unwrap();
        assert_eq!(delivered, 3);
        assert_eq!(seen, vec![0]);
    }
}
