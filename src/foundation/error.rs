/// Convenience result type used across chatsnap.
pub type ChatsnapResult<T> = Result<T, ChatsnapError>;

/// Message returned to callers for server-side failures. Internal detail stays in the logs.
pub const GENERIC_RENDER_FAILURE: &str = "failed to generate image";

/// Top-level error taxonomy used by the render APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChatsnapError {
    /// Invalid user-provided request data. The message names the offending field.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request carries more messages than the configured maximum.
    #[error("validation error: too many messages ({count}), maximum allowed is {max}")]
    TooManyMessages {
        /// Number of messages in the request.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Invalid server-side render configuration. Never caused by request data.
    #[error("config error: {0}")]
    Config(String),

    /// Font loading, canvas allocation, encoding or any other internal fault.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChatsnapError {
    /// Build a [`ChatsnapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChatsnapError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ChatsnapError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ChatsnapError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` when the caller caused the failure (bad input), `false` for server-side faults.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::TooManyMessages { .. })
    }

    /// Text that is safe to hand back across a service boundary.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            GENERIC_RENDER_FAILURE.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
