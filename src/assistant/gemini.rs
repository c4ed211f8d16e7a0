use anyhow::{Context, bail};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

/// Hosted text-generation service.
pub trait TextGenerator: Send + Sync {
    /// False when no credential is configured; no request is made then.
    fn is_configured(&self) -> bool;
    /// Generated text, or `None` when the service returned nothing usable.
    fn generate<'a>(&'a self, prompt: String) -> BoxFuture<'a, anyhow::Result<Option<String>>>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>, endpoint: &str, model: &str) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    async fn request(&self, prompt: String) -> anyhow::Result<Option<String>> {
        let Some(key) = &self.api_key else {
            bail!("no API key configured");
        };
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response = self
            .http
            .post(&url)
            .query(&[("key", key.as_str())])
            .json(&body)
            .send()
            .await
            .context("sending generateContent request")?
            .error_for_status()
            .context("generateContent returned an error status")?
            .json::<GenerateResponse>()
            .await
            .context("decoding generateContent response")?;

        Ok(response.text())
    }
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate<'a>(&'a self, prompt: String) -> BoxFuture<'a, anyhow::Result<Option<String>>> {
        self.request(prompt).boxed()
    }
}
