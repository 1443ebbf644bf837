use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Source of the opaque per-user token the palette backend expects in every
/// request body. In the host platform this is the auth service; on the
/// command line it is a static string.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn user_token(&self) -> Result<String>;
}

/// A fixed token supplied up front (e.g. via `--token`).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn user_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// The two single-shot text-generation calls the pipeline needs. Both
/// return the backend's free-text message, which may or may not contain
/// usable `#RRGGBB (label)` pairs.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Ask for a fresh palette from a natural-language description.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Ask for a revision of an existing palette. The instruction embeds
    /// the current colors; see [`crate::session::Session::edit_instruction`].
    async fn edit(&self, instruction: &str) -> Result<String>;
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
    token: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

/// HTTP client for the palette generation service.
///
/// Configured once with a base URL and a token provider; generation posts
/// to the base URL itself, edits to `<base>/edit-palette`. Requests are
/// single-shot: no retry, no streaming.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    generate_url: Url,
    edit_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("generate_url", &self.generate_url)
            .field("edit_url", &self.edit_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let generate_url = Url::parse(trimmed)
            .with_context(|| format!("invalid backend URL: {base_url:?}"))?;
        let edit_url = Url::parse(&format!("{trimmed}/edit-palette"))
            .with_context(|| format!("invalid backend URL: {base_url:?}"))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            generate_url,
            edit_url,
            tokens,
        })
    }

    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    pub fn edit_url(&self) -> &Url {
        &self.edit_url
    }

    /// Fetch a fresh token, POST the prompt as JSON, return the message.
    async fn post_prompt(&self, url: Url, prompt: &str) -> Result<String> {
        let token = self
            .tokens
            .user_token()
            .await
            .context("token retrieval failed")?;
        debug!(%url, "sending palette request");

        let response = self
            .http
            .post(url)
            .json(&PromptRequest {
                prompt,
                token: &token,
            })
            .send()
            .await
            .context("palette request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("palette backend returned {status}");
        }
        let body: MessageResponse = response
            .json()
            .await
            .context("malformed palette response body")?;
        debug!(chars = body.message.len(), "received palette response");
        Ok(body.message)
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.post_prompt(self.generate_url.clone(), prompt).await
    }

    async fn edit(&self, instruction: &str) -> Result<String> {
        self.post_prompt(self.edit_url.clone(), instruction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Arc<dyn TokenProvider> {
        Arc::new(StaticToken::new("tok-123"))
    }

    #[tokio::test]
    async fn static_token_returns_its_value() {
        let token = StaticToken::new("abc").user_token().await.unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn edit_url_is_derived_from_the_base() {
        let backend = HttpBackend::new("https://palette.example.dev", provider()).unwrap();
        assert_eq!(
            backend.edit_url().as_str(),
            "https://palette.example.dev/edit-palette"
        );
        assert_eq!(
            backend.generate_url().as_str(),
            "https://palette.example.dev/"
        );
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let backend = HttpBackend::new("https://palette.example.dev/", provider()).unwrap();
        assert_eq!(
            backend.edit_url().as_str(),
            "https://palette.example.dev/edit-palette"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpBackend::new("not a url", provider()).unwrap_err().to_string();
        assert!(err.contains("invalid backend URL"), "got: {err}");
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(PromptRequest {
            prompt: "sunset tones",
            token: "tok",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "prompt": "sunset tones", "token": "tok" })
        );
    }

    #[test]
    fn response_body_shape() {
        let parsed: MessageResponse =
            serde_json::from_str(r##"{ "message": "#FF0000 (Red)" }"##).unwrap();
        assert_eq!(parsed.message, "#FF0000 (Red)");
    }
}
