use thiserror::Error;

/// Failures of the fetch loop and the upstream video API.
///
/// `Transport` and `Upstream` are absorbed at the session boundary and replaced by
/// placeholder records; `NoMoreResults` is a caller-contract violation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  /// Network, DNS, TLS or timeout failure before a response arrived.
  #[error("transport error: {0}")]
  Transport(String),
  /// Non-success status or a payload that could not be decoded.
  #[error("upstream error: {0}")]
  Upstream(String),
  /// `load_next_page` called without a cursor for the current session.
  #[error("no more results")]
  NoMoreResults,
}

impl FetchError {
  /// Whether this error is replaced by placeholder records instead of surfacing.
  pub fn is_degradable(&self) -> bool {
    matches!(self, FetchError::Transport(_) | FetchError::Upstream(_))
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      FetchError::Upstream(format!("malformed payload: {}", e))
    } else if let Some(status) = e.status() {
      FetchError::Upstream(format!("status {}: {}", status, e))
    } else {
      FetchError::Transport(e.to_string())
    }
  }
}

impl From<serde_json::Error> for FetchError {
  fn from(e: serde_json::Error) -> Self {
    FetchError::Upstream(format!("malformed payload: {}", e))
  }
}
