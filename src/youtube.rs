use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::constants::constants;
use crate::error::FetchError;
use crate::filters::Category;
use crate::query::SearchParams;

// --- Wire types ---

/// One page from the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
  #[serde(default)]
  pub items: Vec<SearchItem>,
  pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
  #[serde(default)]
  pub id: SearchItemId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
  pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
  #[serde(default)]
  pub items: Vec<RawVideo>,
}

/// A video as returned by the details endpoint. Every part may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVideo {
  #[serde(default)]
  pub id: String,
  pub snippet: Option<Snippet>,
  pub content_details: Option<ContentDetails>,
  pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
  pub title: Option<String>,
  pub channel_title: Option<String>,
  pub channel_id: Option<String>,
  pub description: Option<String>,
  pub published_at: Option<String>,
  pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
  pub high: Option<Thumbnail>,
  pub medium: Option<Thumbnail>,
  pub default: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
  #[serde(default)]
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDetails {
  pub duration: Option<String>,
}

/// Engagement counters. The API encodes them as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
  pub view_count: Option<String>,
  pub like_count: Option<String>,
  pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CategoryListResponse {
  #[serde(default)]
  items: Vec<CategoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryItem {
  id: String,
  snippet: CategorySnippet,
}

#[derive(Debug, Clone, Deserialize)]
struct CategorySnippet {
  title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

/// Decode the suggestion endpoint's `[query, [suggestion, ...], ...]` payload.
pub fn parse_suggestions(body: &str) -> Result<Vec<String>, FetchError> {
  let value: serde_json::Value = serde_json::from_str(body)?;
  let list = value
    .get(1)
    .and_then(|v| v.as_array())
    .ok_or_else(|| FetchError::Upstream("suggestion payload has no list".to_string()))?;
  Ok(list.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
}

// --- API seam ---

/// The endpoints the dashboard consumes.
#[async_trait]
pub trait VideoApi: Send + Sync {
  /// One page of search summaries.
  async fn search(&self, params: &SearchParams) -> Result<SearchListResponse, FetchError>;

  /// Snippet, content details and statistics for a batch of ids.
  async fn video_details(&self, ids: &[String]) -> Result<Vec<RawVideo>, FetchError>;

  /// Assignable categories for a region.
  async fn categories(&self, region: &str) -> Result<Vec<Category>, FetchError>;

  /// Autocomplete suggestions for a partial term.
  async fn suggestions(&self, partial: &str) -> Result<Vec<String>, FetchError>;
}

/// `VideoApi` backed by the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
  http: Client,
  base_url: String,
  api_key: String,
}

impl YouTubeClient {
  pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
    let http = Client::builder()
      .timeout(Duration::from_secs(constants().request_timeout_secs))
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))?;
    Ok(Self { http, base_url: constants().api_base_url.clone(), api_key: api_key.into() })
  }

  async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, FetchError> {
    let url = format!("{}/{}", self.base_url, endpoint);
    debug!(endpoint, params = query.len(), "youtube: request");
    let response = self.http.get(&url).query(query).query(&[("key", self.api_key.as_str())]).send().await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
      let message = serde_json::from_str::<ApiErrorBody>(&body).map(|b| b.error.message).unwrap_or(body);
      return Err(FetchError::Upstream(format!("{} returned {}: {}", endpoint, status, message)));
    }
    Ok(serde_json::from_str(&body)?)
  }
}

#[async_trait]
impl VideoApi for YouTubeClient {
  async fn search(&self, params: &SearchParams) -> Result<SearchListResponse, FetchError> {
    self.get_json("search", params.pairs()).await
  }

  async fn video_details(&self, ids: &[String]) -> Result<Vec<RawVideo>, FetchError> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let query = [("part", "snippet,contentDetails,statistics".to_string()), ("id", ids.join(","))];
    let response: VideoListResponse = self.get_json("videos", &query).await?;
    Ok(response.items)
  }

  async fn categories(&self, region: &str) -> Result<Vec<Category>, FetchError> {
    let query = [("part", "snippet".to_string()), ("regionCode", region.to_uppercase())];
    let response: CategoryListResponse = self.get_json("videoCategories", &query).await?;
    Ok(response.items.into_iter().map(|item| Category::new(item.id, item.snippet.title)).collect())
  }

  async fn suggestions(&self, partial: &str) -> Result<Vec<String>, FetchError> {
    let response = self
      .http
      .get(&constants().suggest_url)
      .query(&[("client", "firefox"), ("ds", "yt"), ("q", partial)])
      .send()
      .await?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Upstream(format!("suggestions returned {}", status)));
    }
    let body = response.text().await?;
    parse_suggestions(&body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn search_page_decodes() {
    let body = r#"{
      "kind": "youtube#searchListResponse",
      "nextPageToken": "CAwQAA",
      "items": [
        {"id": {"kind": "youtube#video", "videoId": "abc"}},
        {"id": {"kind": "youtube#video", "videoId": "def"}}
      ]
    }"#;
    let page: SearchListResponse = serde_json::from_str(body).unwrap();
    assert_eq!(page.next_page_token.as_deref(), Some("CAwQAA"));
    let ids: Vec<_> = page.items.iter().filter_map(|i| i.id.video_id.clone()).collect();
    assert_eq!(ids, ["abc", "def"]);
  }

  #[test]
  fn search_page_without_items() {
    let page: SearchListResponse = serde_json::from_str(r#"{"kind": "youtube#searchListResponse"}"#).unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_page_token.is_none());
  }

  #[test]
  fn video_without_statistics_decodes() {
    let body = r#"{"items": [{"id": "abc", "snippet": {"title": "T", "thumbnails": {}}}]}"#;
    let list: VideoListResponse = serde_json::from_str(body).unwrap();
    assert_eq!(list.items.len(), 1);
    assert!(list.items[0].statistics.is_none());
    assert!(list.items[0].content_details.is_none());
  }

  #[test]
  fn suggestions_payload() {
    let body = r#"["rust", ["rust tutorial", "rust game", "rust lang"]]"#;
    assert_eq!(parse_suggestions(body).unwrap(), ["rust tutorial", "rust game", "rust lang"]);
  }

  #[test]
  fn suggestions_payload_malformed() {
    assert!(matches!(parse_suggestions(r#"{"q": "rust"}"#), Err(FetchError::Upstream(_))));
    assert!(matches!(parse_suggestions("window.google.ac.h(["), Err(FetchError::Upstream(_))));
  }

  #[test]
  fn api_error_body_decodes() {
    let body = r#"{"error": {"code": 403, "message": "quota exceeded", "errors": []}}"#;
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.error.message, "quota exceeded");
  }
}
