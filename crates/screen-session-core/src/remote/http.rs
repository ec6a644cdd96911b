//! HTTP binding of [`RemoteSync`].
//!
//! Each operation maps to one endpoint of the recording service. Replies are
//! JSON objects carrying either `message` or `error`.

use crate::{
    CoreResult, SessionError,
    remote::{Payload, RemoteReply, RemoteSync},
};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Multipart field the service reads the recording from.
const UPLOAD_FIELD: &str = "file";

struct Endpoint {
    operation: &'static str,
    method: Method,
    path: &'static str,
    /// Detail used when the service fails without saying why.
    failure: &'static str,
}

const START: Endpoint = Endpoint {
    operation: "notify-start",
    method: Method::GET,
    path: "start",
    failure: "Failed to start recording",
};

const PAUSE: Endpoint = Endpoint {
    operation: "notify-pause",
    method: Method::GET,
    path: "pause",
    failure: "Failed to pause recording",
};

const RESUME: Endpoint = Endpoint {
    operation: "notify-resume",
    method: Method::GET,
    path: "resume",
    failure: "Failed to resume recording",
};

const STOP: Endpoint = Endpoint {
    operation: "notify-stop",
    method: Method::POST,
    path: "stop",
    failure: "Failed to stop recording",
};

const DISCARD: Endpoint = Endpoint {
    operation: "notify-discard",
    method: Method::GET,
    path: "discard",
    failure: "Failed to discard recording",
};

const SAVE: Endpoint = Endpoint {
    operation: "submit-payload",
    method: Method::POST,
    path: "save",
    failure: "Failed to upload recording",
};

/// Reply body shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct ServerReply {
    message: Option<String>,
    error: Option<String>,
    filename: Option<String>,
}

/// [`RemoteSync`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRemoteSync {
    client: Client,
    base_url: String,
}

impl HttpRemoteSync {
    /// Client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a remote error if the HTTP client cannot be built.
    #[track_caller]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::remote("connect", format!("Failed to build client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        info!(base_url = %base_url, "Remote sync client initialized");

        Ok(Self { client, base_url })
    }

    /// Service root, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, endpoint: &Endpoint) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, endpoint.path);
        self.client.request(endpoint.method.clone(), url)
    }

    async fn call(&self, endpoint: &Endpoint, request: RequestBuilder) -> CoreResult<RemoteReply> {
        let response = request.send().await.map_err(|e| {
            SessionError::remote(endpoint.operation, format!("Request failed: {}", e))
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            SessionError::remote(endpoint.operation, format!("Failed to read reply: {}", e))
        })?;

        // Error pages are not always JSON; treat an unreadable body as empty.
        let reply: ServerReply = if body.is_empty() {
            ServerReply::default()
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|e| {
                debug!(error = %e, status = %status, "Reply body is not JSON");
                ServerReply::default()
            })
        };

        if !status.is_success() {
            let reason = reply
                .error
                .unwrap_or_else(|| format!("Server error: {}", endpoint.failure));
            warn!(operation = endpoint.operation, status = %status, reason = %reason, "Remote call rejected");
            return Err(SessionError::remote(endpoint.operation, reason));
        }

        if let Some(error) = reply.error {
            warn!(operation = endpoint.operation, reason = %error, "Remote call reported an error");
            return Err(SessionError::remote(endpoint.operation, error));
        }

        debug!(operation = endpoint.operation, status = %status, "Remote call acknowledged");

        Ok(RemoteReply {
            message: reply.message,
            filename: reply.filename,
        })
    }

    async fn notify(&self, endpoint: &Endpoint) -> CoreResult<RemoteReply> {
        self.call(endpoint, self.request(endpoint)).await
    }
}

#[async_trait]
impl RemoteSync for HttpRemoteSync {
    #[instrument(skip(self))]
    async fn notify_start(&self) -> CoreResult<RemoteReply> {
        self.notify(&START).await
    }

    #[instrument(skip(self))]
    async fn notify_pause(&self) -> CoreResult<RemoteReply> {
        self.notify(&PAUSE).await
    }

    #[instrument(skip(self))]
    async fn notify_resume(&self) -> CoreResult<RemoteReply> {
        self.notify(&RESUME).await
    }

    #[instrument(skip(self))]
    async fn notify_stop(&self) -> CoreResult<RemoteReply> {
        self.notify(&STOP).await
    }

    #[instrument(skip(self))]
    async fn notify_discard(&self) -> CoreResult<RemoteReply> {
        self.notify(&DISCARD).await
    }

    #[instrument(skip(self, payload), fields(filename = %payload.filename, size = payload.bytes.len()))]
    async fn submit_payload(&self, payload: Payload) -> CoreResult<RemoteReply> {
        let part = Part::bytes(payload.bytes)
            .file_name(payload.filename)
            .mime_str(&payload.content_type)
            .map_err(|e| {
                SessionError::remote(SAVE.operation, format!("Invalid content type: {}", e))
            })?;

        let form = Form::new().part(UPLOAD_FIELD, part);
        let reply = self.call(&SAVE, self.request(&SAVE).multipart(form)).await?;

        info!(stored_as = ?reply.filename, "Recording uploaded");

        Ok(reply)
    }
}
