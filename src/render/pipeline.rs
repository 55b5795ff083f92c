use std::sync::Arc;

use crate::assets::fetch::{AvatarFetcher, HttpAvatarFetcher};
use crate::config::RenderConfig;
use crate::foundation::error::ChatsnapResult;
use crate::model::message::{RawMessage, RenderRequest, validate_messages};
use crate::render::backend::RenderBackend;
use crate::render::cpu::CpuBackend;
use crate::text::typeface::{FontFace, Typeface};

/// Validating entry point: configuration plus a backend.
///
/// Pipeline per call:
/// 1. [`validate_messages`] (count before anything else)
/// 2. [`RenderBackend::render`]: measure, avatar resolution, draw, PNG encode
///
/// `Renderer` is `Send + Sync`; one instance can serve concurrent requests.
pub struct Renderer {
    config: RenderConfig,
    backend: Box<dyn RenderBackend>,
}

impl Renderer {
    /// CPU renderer drawing with `typeface` and fetching avatars through `fetcher`.
    pub fn new(
        config: RenderConfig,
        typeface: Arc<dyn Typeface>,
        fetcher: Arc<dyn AvatarFetcher>,
    ) -> ChatsnapResult<Self> {
        Self::with_backend(config, Box::new(CpuBackend::new(typeface, fetcher)))
    }

    /// Renderer over an arbitrary backend.
    pub fn with_backend(
        config: RenderConfig,
        backend: Box<dyn RenderBackend>,
    ) -> ChatsnapResult<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// Load the configured font (or the system sans-serif) and an HTTP avatar fetcher.
    pub fn from_config(config: RenderConfig) -> ChatsnapResult<Self> {
        config.validate()?;
        let typeface = FontFace::load(&config)?;
        let fetcher = HttpAvatarFetcher::from_config(&config)?;
        Self::new(config, Arc::new(typeface), Arc::new(fetcher))
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Validate raw records and render them to PNG bytes.
    #[tracing::instrument(skip(self, messages), fields(count = messages.len()))]
    pub fn render(&self, messages: &[RawMessage]) -> ChatsnapResult<Vec<u8>> {
        let result = validate_messages(messages, &self.config)
            .and_then(|validated| self.backend.render(&validated, &self.config));
        match &result {
            Ok(png) => tracing::debug!(bytes = png.len(), "chat image rendered"),
            Err(e) if e.is_client_error() => tracing::debug!(error = %e, "request rejected"),
            Err(e) => tracing::error!(error = %e, "chat image render failed"),
        }
        result
    }

    /// Render a parsed request body.
    pub fn render_request(&self, request: &RenderRequest) -> ChatsnapResult<Vec<u8>> {
        self.render(&request.messages)
    }

    /// Parse a JSON request body and render it.
    #[tracing::instrument(skip_all, fields(len = body.len()))]
    pub fn render_json(&self, body: &[u8]) -> ChatsnapResult<Vec<u8>> {
        let request = RenderRequest::from_json(body)?;
        self.render_request(&request)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
