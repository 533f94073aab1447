//! In-memory `VideoApi` used by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::FetchError;
use crate::filters::Category;
use crate::query::SearchParams;
use crate::youtube::{
  ContentDetails, RawVideo, SearchItem, SearchItemId, SearchListResponse, Snippet, Statistics, VideoApi,
};

/// A search page with `n` ids named `{prefix}-{i}`.
pub fn page_of(prefix: &str, n: usize, next: Option<&str>) -> SearchListResponse {
  SearchListResponse {
    items: (0..n)
      .map(|i| SearchItem { id: SearchItemId { video_id: Some(format!("{}-{}", prefix, i)) } })
      .collect(),
    next_page_token: next.map(str::to_string),
  }
}

/// Scripted API: search pages are served in order, details are synthesized per id.
pub struct FakeApi {
  pub pages: Mutex<VecDeque<Result<SearchListResponse, FetchError>>>,
  pub seen: Mutex<Vec<SearchParams>>,
  pub empty_details: bool,
  pub skip_detail_ids: Vec<String>,
  pub categories: Result<Vec<Category>, FetchError>,
  pub suggestions: Result<Vec<String>, FetchError>,
}

impl FakeApi {
  pub fn with_pages(pages: Vec<Result<SearchListResponse, FetchError>>) -> Self {
    Self {
      pages: Mutex::new(pages.into()),
      seen: Mutex::new(Vec::new()),
      empty_details: false,
      skip_detail_ids: Vec::new(),
      categories: Ok(Vec::new()),
      suggestions: Ok(Vec::new()),
    }
  }

  pub fn seen(&self) -> Vec<SearchParams> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl VideoApi for FakeApi {
  async fn search(&self, params: &SearchParams) -> Result<SearchListResponse, FetchError> {
    self.seen.lock().unwrap().push(params.clone());
    self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Err(FetchError::Transport("no scripted page".into())))
  }

  async fn video_details(&self, ids: &[String]) -> Result<Vec<RawVideo>, FetchError> {
    if self.empty_details {
      return Ok(Vec::new());
    }
    Ok(
      ids
        .iter()
        .filter(|id| !self.skip_detail_ids.contains(id))
        .map(|id| RawVideo {
          id: id.clone(),
          snippet: Some(Snippet {
            title: Some(format!("Video {}", id)),
            channel_title: Some("Fake Channel".to_string()),
            ..Snippet::default()
          }),
          content_details: Some(ContentDetails { duration: Some("PT4M2S".to_string()) }),
          statistics: Some(Statistics {
            view_count: Some("1000".to_string()),
            like_count: Some("100".to_string()),
            comment_count: Some("10".to_string()),
          }),
        })
        .rev()
        .collect(),
    )
  }

  async fn categories(&self, _region: &str) -> Result<Vec<Category>, FetchError> {
    self.categories.clone()
  }

  async fn suggestions(&self, _partial: &str) -> Result<Vec<String>, FetchError> {
    self.suggestions.clone()
  }
}
