use std::io::Read as _;
use std::time::{Duration, Instant};

use crate::config::RenderConfig;
use crate::foundation::error::{ChatsnapError, ChatsnapResult};

/// Why an avatar could not be turned into a tile. Never escapes the avatar resolver.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AvatarFetchError {
    /// Unparseable URL or a scheme other than http/https.
    #[error("invalid avatar url: {0}")]
    InvalidUrl(String),
    /// The host did not answer within the configured timeout.
    #[error("avatar request timed out")]
    Timeout,
    /// Connection, TLS or protocol failure.
    #[error("avatar request failed: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("avatar host returned HTTP {0}")]
    Status(u16),
    /// Body larger than the configured limit.
    #[error("avatar body exceeds {0} bytes")]
    TooLarge(usize),
    /// Bytes arrived but are not a decodable image.
    #[error("avatar decode failed: {0}")]
    Decode(String),
}

/// Source of raw avatar bytes.
pub trait AvatarFetcher: Send + Sync {
    /// Fetch the bytes behind `url`. Implementations must bound their own latency.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AvatarFetchError>;
}

const READ_CHUNK: usize = 8 * 1024;

/// Blocking HTTP fetcher with a whole-request deadline and a body size cap.
#[derive(Clone, Debug)]
pub struct HttpAvatarFetcher {
    client: reqwest::blocking::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpAvatarFetcher {
    /// Build a fetcher; `timeout` is a deadline covering connect, headers and the whole body.
    pub fn new(timeout: Duration, max_bytes: usize) -> ChatsnapResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("chatsnap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatsnapError::render(format!("build avatar http client: {e}")))?;
        Ok(Self {
            client,
            timeout,
            max_bytes,
        })
    }

    /// Build a fetcher from `avatar_timeout_ms` / `avatar_max_bytes`.
    pub fn from_config(cfg: &RenderConfig) -> ChatsnapResult<Self> {
        Self::new(
            Duration::from_millis(cfg.avatar_timeout_ms),
            cfg.avatar_max_bytes,
        )
    }
}

impl AvatarFetcher for HttpAvatarFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AvatarFetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| AvatarFetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AvatarFetchError::InvalidUrl(format!(
                "{url}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let deadline = Instant::now() + self.timeout;
        let resp = self
            .client
            .get(parsed)
            .timeout(remaining(deadline)?)
            .send()
            .map_err(classify_reqwest)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AvatarFetchError::Status(status.as_u16()));
        }
        if let Some(len) = resp.content_length()
            && len > self.max_bytes as u64
        {
            return Err(AvatarFetchError::TooLarge(self.max_bytes));
        }

        read_body(resp, self.max_bytes, deadline)
    }
}

/// Read in chunks so a host trickling bytes cannot outlive `deadline`.
fn read_body(
    mut resp: reqwest::blocking::Response,
    max_bytes: usize,
    deadline: Instant,
) -> Result<Vec<u8>, AvatarFetchError> {
    let mut body = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        remaining(deadline)?;
        let n = resp.read(&mut chunk).map_err(|e| match e.kind() {
            std::io::ErrorKind::TimedOut => AvatarFetchError::Timeout,
            _ => AvatarFetchError::Transport(e.to_string()),
        })?;
        if n == 0 {
            return Ok(body);
        }
        if body.len() + n > max_bytes {
            return Err(AvatarFetchError::TooLarge(max_bytes));
        }
        body.extend_from_slice(&chunk[..n]);
    }
}

fn remaining(deadline: Instant) -> Result<Duration, AvatarFetchError> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(AvatarFetchError::Timeout)
    } else {
        Ok(left)
    }
}

fn classify_reqwest(err: reqwest::Error) -> AvatarFetchError {
    if err.is_timeout() {
        AvatarFetchError::Timeout
    } else {
        AvatarFetchError::Transport(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
