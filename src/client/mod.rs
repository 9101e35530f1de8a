//! HTTP client for the Kulturarv chat service.
//!
//! [`ChatClient::open_stream`] is the transport reader: it performs the
//! request and hands back the raw body. [`ChatClient::stream_message`]
//! composes it with [`Dispatcher`] to deliver typed events.

pub mod http;

use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{KulturarvError, Result};
use crate::stream::{collect_response, decode_events, Dispatcher, StreamHandler, StreamOutcome};
use crate::types::{ChatRequest, ChatResponse, ChatStatus, StreamEvent};

const CHAT_PATH: &str = "/api/chat";
const STREAM_PATH: &str = "/api/chat/stream";
const STATUS_PATH: &str = "/api/chat/status";

/// Longest wait for the first chunk of an error body.
const ERROR_BODY_WAIT: Duration = Duration::from_secs(2);
/// Bytes of an error body inspected for the server's message.
const ERROR_BODY_LIMIT: usize = 4096;

/// Response body of a successful streaming request.
///
/// Holds the connection open; dropping it releases the connection.
#[derive(Debug)]
pub struct ByteStream {
    response: reqwest::Response,
}

impl ByteStream {
    /// Each item is one chunk or a transport fault; the stream ends with
    /// the body.
    pub fn into_stream(self) -> impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static {
        self.response.bytes_stream()
    }
}

/// Client for the chat endpoints.
#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        check_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Whether chat is enabled and which sources are available. No token needed.
    pub async fn check_status(&self) -> Result<ChatStatus> {
        let resp = self.http.get(self.url(STATUS_PATH)).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(KulturarvError::api(status, "Failed to check chat status"));
        }
        Ok(resp.json().await?)
    }

    /// Non-streaming fallback: one request, one complete response.
    pub async fn send_message(&self, token: &str, request: &ChatRequest) -> Result<ChatResponse> {
        validate(request)?;
        debug!(sources = ?request.sources, "sending chat message");

        let resp = self
            .http
            .post(self.url(CHAT_PATH))
            .headers(http::bearer_headers(token)?)
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Open the streaming endpoint.
    ///
    /// Non-success statuses are classified and returned before any of the
    /// body is read. Returns `Ok(None)` if `cancel` fires while waiting for
    /// the response headers.
    pub async fn open_stream(
        &self,
        token: &str,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<ByteStream>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("chat stream cancelled before response headers");
                Ok(None)
            }
            body = self.connect(token, request) => body.map(Some),
        }
    }

    async fn connect(&self, token: &str, request: &ChatRequest) -> Result<ByteStream> {
        validate(request)?;
        let headers = http::sse_headers(token)?;
        debug!(
            sources = ?request.sources,
            history = request.conversation_history.len(),
            "opening chat stream"
        );

        let resp = self
            .http
            .post(self.url(STREAM_PATH))
            .headers(headers)
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for(resp).await);
        }
        Ok(ByteStream { response: resp })
    }

    /// Stream a reply, delivering each event to `handler` as it arrives.
    ///
    /// Errors before streaming starts (bad token, rate limit, HTTP failure)
    /// are returned as `Err` and no handler method runs. Everything after
    /// that is reported through the handler and the returned outcome.
    pub async fn stream_message<H>(
        &self,
        token: &str,
        request: &ChatRequest,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome>
    where
        H: StreamHandler + ?Sized,
    {
        let mut dispatcher = Dispatcher::new(handler).with_cancellation(cancel.clone());
        if cancel.is_cancelled() {
            return Ok(dispatcher.cancel());
        }

        dispatcher.connect();
        match self.open_stream(token, request, cancel).await? {
            Some(body) => Ok(dispatcher.run(body.into_stream()).await),
            None => Ok(dispatcher.cancel()),
        }
    }

    /// Stream a reply as a pull-based sequence of events.
    pub async fn stream_events(
        &self,
        token: &str,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let body = self.connect(token, request).await?;
        Ok(decode_events(body.into_stream()))
    }

    /// Stream a reply and wait for the complete response.
    ///
    /// An `error` frame from the server, or a body that ends without
    /// `done`, is returned as [`KulturarvError::Stream`].
    pub async fn collect_message(
        &self,
        token: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse> {
        collect_response(self.stream_events(token, request).await?).await
    }
}

/// Classify a non-success response without waiting on its body.
///
/// 401 is decided on the status alone. Other statuses read at most one
/// bounded chunk, within [`ERROR_BODY_WAIT`], to pick up the server's
/// message; the rest of the body is dropped unread.
async fn error_for(mut resp: reqwest::Response) -> KulturarvError {
    let status = resp.status().as_u16();
    if status == 401 {
        return http::status_to_error(status, "");
    }

    let body = match tokio::time::timeout(ERROR_BODY_WAIT, resp.chunk()).await {
        Ok(Ok(Some(chunk))) => {
            let end = chunk.len().min(ERROR_BODY_LIMIT);
            String::from_utf8_lossy(&chunk[..end]).into_owned()
        }
        Ok(Ok(None)) => String::new(),
        Ok(Err(err)) => {
            debug!(status, error = %err, "failed to read error body");
            String::new()
        }
        Err(_) => {
            debug!(status, "error body did not arrive in time");
            String::new()
        }
    };
    http::status_to_error(status, &body)
}

fn check_base_url(base_url: &str) -> Result<()> {
    let url = reqwest::Url::parse(base_url).map_err(|e| {
        KulturarvError::Configuration(format!("invalid base URL {base_url:?}: {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(KulturarvError::Configuration(format!(
            "unsupported base URL scheme {scheme:?}"
        ))),
    }
}

fn validate(request: &ChatRequest) -> Result<()> {
    if request.message.trim().is_empty() {
        return Err(KulturarvError::InvalidArgument(
            "message must not be empty".into(),
        ));
    }
    if request.sources.is_empty() {
        return Err(KulturarvError::InvalidArgument(
            "select at least one source".into(),
        ));
    }
    Ok(())
}
