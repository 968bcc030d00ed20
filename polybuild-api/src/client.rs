//! Blocking HTTP client for the signed API.
//!
//! Every call is a POST of the signed form to `{base_url}/{method}`.
//! Responses are classified by [`classify`]:
//!
//! | body                                   | HTTP status | result                     |
//! |----------------------------------------|-------------|----------------------------|
//! | JSON envelope, `status == "OK"`        | any         | `Ok(result)` (or `Null`)   |
//! | JSON envelope, other status            | any         | `Remote(comment)`          |
//! | not JSON                               | 2xx         | `Ok(String(body))`         |
//! | not JSON                               | other       | `Transport(status, body)`  |
//!
//! The service returns envelopes with HTTP 400, so envelope parsing wins over
//! the status code. No retry happens at this layer.

use serde::Deserialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::signer::{self, Params};

/// Anything that can execute a remote method call.
///
/// The pipeline only talks to this trait, so tests can substitute a
/// recording fake for the HTTP client.
pub trait Api {
    fn call(&self, method: &str, params: &Params) -> Result<Value, ApiError>;
}

impl<T: Api + ?Sized> Api for &T {
    fn call(&self, method: &str, params: &Params) -> Result<Value, ApiError> {
        (**self).call(method, params)
    }
}

/// HTTP implementation of [`Api`].
pub struct Client {
    agent: ureq::Agent,
    config: ApiConfig,
}

impl Client {
    pub fn new(config: ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { agent, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.config.base_url, method)
    }
}

impl Api for Client {
    fn call(&self, method: &str, params: &Params) -> Result<Value, ApiError> {
        let signed = signer::sign(method, params, &self.config.credentials);
        let url = self.url(method);
        tracing::debug!(method, url = %url, nonce = %signed.nonce, "POST");

        let response = match self.agent.post(&url).send_form(&signed.form()) {
            Ok(resp) => resp,
            // Error statuses still carry a body worth classifying.
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(err)) => {
                return Err(ApiError::Transport {
                    method: method.to_string(),
                    status: None,
                    detail: err.to_string(),
                });
            }
        };

        let status = response.status();
        let content_type = response.content_type().to_string();
        let body = response.into_string().map_err(|e| ApiError::Transport {
            method: method.to_string(),
            status: Some(status),
            detail: format!("failed to read response body: {e}"),
        })?;
        tracing::debug!(method, status, bytes = body.len(), "response");

        classify(method, status, &content_type, &body)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    comment: Option<Value>,
}

/// Turn a raw HTTP response into a call result. Pure.
pub fn classify(
    method: &str,
    status: u16,
    content_type: &str,
    body: &str,
) -> Result<Value, ApiError> {
    if is_json_media_type(content_type) || body.trim_start().starts_with('{') {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| ApiError::Transport {
                method: method.to_string(),
                status: Some(status),
                detail: format!("HTTP {status}: malformed JSON body ({e}): {}", body.trim()),
            })?;
        return match envelope.status.as_deref() {
            Some("OK") => Ok(envelope.result.unwrap_or(Value::Null)),
            _ => Err(ApiError::Remote {
                method: method.to_string(),
                comment: match envelope.comment {
                    Some(Value::String(text)) => text,
                    None | Some(Value::Null) => body.trim().to_string(),
                    Some(other) => other.to_string(),
                },
            }),
        };
    }

    if (200..300).contains(&status) {
        Ok(Value::String(body.to_string()))
    } else {
        Err(ApiError::Transport {
            method: method.to_string(),
            status: Some(status),
            detail: format!("HTTP {status}: {}", body.trim()),
        })
    }
}

fn is_json_media_type(content_type: &str) -> bool {
    let media = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media == "application/json" || media.ends_with("+json")
}
