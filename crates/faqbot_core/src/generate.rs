use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;

pub const MAX_CONTEXT_CHARS: usize = 2000;
pub const ELLIPSIS: &str = "...";
pub const FALLBACK_APOLOGY: &str =
    "I apologize, but I'm having trouble generating a response at the moment.";

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// A service that turns a prompt into text.
pub trait TextGenerator {
    fn complete(&self, prompt: &str) -> Result<String>;

    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

impl TextGenerator for Box<dyn TextGenerator> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }

    fn health_check(&self) -> Result<()> {
        (**self).health_check()
    }
}

pub fn truncate_context(context: &str) -> Cow<'_, str> {
    match context.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &context[..cut])),
        None => Cow::Borrowed(context),
    }
}

pub fn build_prompt(query: &str, context: &str) -> String {
    let context = truncate_context(context);
    format!(
        "Context: {context}\n\n\
         Question: {query}\n\n\
         Please provide a helpful and accurate response based on the given context and question. \
         If the context is from a document, use specific information from it."
    )
}

pub fn generate<G>(generator: &G, query: &str, context: &str) -> Result<String>
where
    G: TextGenerator + ?Sized,
{
    let prompt = build_prompt(query, context);
    tracing::debug!(prompt_chars = prompt.chars().count(), "sending fallback prompt");
    generator.complete(&prompt)
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// `OLLAMA_HOST` is commonly set without a scheme (`127.0.0.1:11434`).
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Blocking client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaGenerator {
    host: String,
    model: String,
    client: Client,
}

impl OllamaGenerator {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            host: normalize_host(&host.into()),
            model: model.into(),
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OllamaGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::ModelStatus { status, body });
        }

        let reply: GenerateResponse = response.json()?;
        reply
            .response
            .ok_or_else(|| Error::MalformedReply("missing 'response' field".to_string()))
    }

    fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.host);
        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::ModelStatus { status, body });
        }

        let tags: TagsResponse = response.json()?;
        let wanted = &self.model;
        let found = tags
            .models
            .iter()
            .any(|m| &m.name == wanted || m.name == format!("{wanted}:latest"));
        if !found {
            return Err(Error::ModelNotFound(self.model.clone()));
        }

        tracing::info!(host = %self.host, model = %self.model, "model service reachable");
        Ok(())
    }
}
