//! Chat backend over HTTP
//!
//! `POST {base}/api/chat` with `{query, chatHistory}`. A 2xx reply must
//! carry `{response}`; anything else is classified into a [`ChatFailure`].

use super::{ChatFailure, Collaborator, OutboundRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub struct HttpCollaborator {
    client: Client,
    endpoint: String,
}

impl HttpCollaborator {
    /// `timeout` of `None` leaves the request unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReplyBody {
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn complete(&self, request: &OutboundRequest) -> Result<String, ChatFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else {
                    "request"
                };
                ChatFailure::transport().with_detail(format!("{reason}: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatFailure::transport().with_detail(format!("read body: {e}")))?;

        let reply: ReplyBody = serde_json::from_str(&body).map_err(|e| {
            ChatFailure::malformed().with_detail(format!("HTTP {status}, unparseable body: {e}"))
        })?;

        if !status.is_success() {
            let error = reply.error.as_ref().and_then(Value::as_str);
            return Err(ChatFailure::provider(error).with_detail(format!("HTTP {status}")));
        }

        match reply.response {
            Some(Value::String(text)) => Ok(text),
            other => Err(ChatFailure::malformed()
                .with_detail(format!("HTTP {status} without string `response`: {other:?}"))),
        }
    }
}
