//! Outbound operations for the presentation layer.
//!
//! The free functions take `&dyn VideoApi` so the TUI can run them inside spawned
//! tasks; `Dashboard` wraps them around an owned session for sequential callers
//! such as `--print`.

use chrono::{Datelike, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::constants::constants;
use crate::error::FetchError;
use crate::filters::{ALL_CATEGORIES, Category, FilterState};
use crate::normalize::{VideoRecord, placeholders};
use crate::query::{SearchParams, listing_params, trending_params};
use crate::session::{PageView, SearchSession, fetch_page};
use crate::youtube::VideoApi;

/// Records of one listing (trending or a discover niche).
#[derive(Debug, Clone)]
pub struct Listing {
  pub label: String,
  pub records: Vec<VideoRecord>,
}

async fn fetch_listing(api: &dyn VideoApi, params: &SearchParams, label: &str, fallback: usize) -> Listing {
  let records = match fetch_page(api, params, label, Utc::now()).await {
    Ok(page) => page.records,
    Err(e) => {
      warn!(err = %e, label, "listing: fetch failed, serving placeholders");
      placeholders(fallback, label)
    }
  };
  info!(label, count = records.len(), "listing: loaded");
  Listing { label: label.to_string(), records }
}

/// Trending videos for a region.
pub async fn trending(api: &dyn VideoApi, region: &str) -> Listing {
  fetch_listing(api, &trending_params(region), "Trending", constants().trending_placeholder_size).await
}

/// One discover niche, searched by its name.
pub async fn niche(api: &dyn VideoApi, name: &str) -> Listing {
  let c = constants();
  fetch_listing(api, &listing_params(name, c.niche_page_size), name, c.niche_page_size as usize).await
}

/// Every configured niche, fetched one after another to stay clear of rate limits.
pub async fn discover(api: &dyn VideoApi) -> Vec<Listing> {
  stream::iter(constants().niches.iter()).then(|name| niche(api, name)).collect().await
}

/// Category choices for a region: `All Categories` first, then the live list,
/// or the built-in table when the listing fails or comes back empty.
pub async fn category_list(api: &dyn VideoApi, region: &str) -> Vec<Category> {
  match api.categories(region).await {
    Ok(categories) if !categories.is_empty() => std::iter::once(Category::all())
      .chain(categories.into_iter().filter(|c| c.id != ALL_CATEGORIES))
      .collect(),
    Ok(_) => Category::defaults(),
    Err(e) => {
      warn!(err = %e, region, "categories: fetch failed, using built-in list");
      Category::defaults()
    }
  }
}

fn fallback_suggestions(partial: &str) -> Vec<String> {
  vec![
    format!("{} tutorial", partial),
    format!("{} review", partial),
    format!("{} explained", partial),
    format!("best {}", partial),
    format!("{} {}", partial, Utc::now().year()),
  ]
}

/// Autocomplete for a partial term. Blank input yields nothing; a failed lookup
/// yields a few generic completions instead.
pub async fn suggest(api: &dyn VideoApi, partial: &str) -> Vec<String> {
  let partial = partial.trim();
  if partial.is_empty() {
    return Vec::new();
  }
  match api.suggestions(partial).await {
    Ok(mut list) => {
      list.truncate(constants().max_suggestions);
      list
    }
    Err(e) => {
      warn!(err = %e, "suggest: lookup failed, using generic completions");
      fallback_suggestions(partial)
    }
  }
}

/// A search session bound to an API, for callers that await each step in turn.
pub struct Dashboard {
  api: Arc<dyn VideoApi>,
  session: SearchSession,
}

impl Dashboard {
  pub fn new(api: Arc<dyn VideoApi>, filters: FilterState) -> Self {
    Self { api, session: SearchSession::new(filters) }
  }

  pub fn session(&self) -> &SearchSession {
    &self.session
  }

  /// Start a new search and return its first page.
  pub async fn search(&mut self, term: &str, filters: FilterState) -> PageView {
    let request = self.session.begin_search(term, filters);
    let outcome = fetch_page(self.api.as_ref(), &request.params, &request.label, Utc::now()).await;
    self.session.complete(&request, outcome).unwrap_or_default()
  }

  /// Fetch and append the next page of the current search.
  pub async fn load_more(&mut self) -> Result<PageView, FetchError> {
    let Some(request) = self.session.begin_next_page()? else {
      return Ok(PageView { records: Vec::new(), has_more: self.session.has_more() });
    };
    let outcome = fetch_page(self.api.as_ref(), &request.params, &request.label, Utc::now()).await;
    Ok(self.session.complete(&request, outcome).unwrap_or_default())
  }

  /// Change the filters of the current session; see `SearchSession::update_filters`.
  pub fn update_filters(&mut self, filters: FilterState) {
    self.session.update_filters(filters);
  }

  pub async fn category_list(&self, region: &str) -> Vec<Category> {
    category_list(self.api.as_ref(), region).await
  }

  pub async fn suggest(&self, partial: &str) -> Vec<String> {
    suggest(self.api.as_ref(), partial).await
  }

  pub async fn trending(&self, region: &str) -> Listing {
    trending(self.api.as_ref(), region).await
  }

  pub async fn discover(&self) -> Vec<Listing> {
    discover(self.api.as_ref()).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filters::SortOrder;
  use crate::test_support::{FakeApi, page_of};

  fn dashboard(api: FakeApi) -> (Arc<FakeApi>, Dashboard) {
    let api = Arc::new(api);
    let dash = Dashboard::new(api.clone(), FilterState::default());
    (api, dash)
  }

  // --- search / load_more ---

  #[tokio::test]
  async fn search_then_load_more_accumulates() {
    let (api, mut dash) =
      dashboard(FakeApi::with_pages(vec![Ok(page_of("a", 12, Some("T1"))), Ok(page_of("b", 7, None))]));

    let first = dash.search("cats", FilterState::default()).await;
    assert_eq!(first.records.len(), 12);
    assert!(first.has_more);

    let second = dash.load_more().await.unwrap();
    assert_eq!(second.records.len(), 7);
    assert!(!second.has_more);
    assert_eq!(dash.session().records().len(), 19);

    let seen = api.seen();
    assert_eq!(seen[0].get("pageToken"), None);
    assert_eq!(seen[1].get("pageToken"), Some("T1"));
    assert_eq!(seen[1].get("q"), Some("cats"));
  }

  #[tokio::test]
  async fn empty_term_sends_default_term() {
    let (api, mut dash) = dashboard(FakeApi::with_pages(vec![Ok(page_of("a", 1, None))]));
    dash.search("", FilterState::default()).await;
    assert_eq!(api.seen()[0].get("q"), Some("popular videos"));
  }

  #[tokio::test]
  async fn empty_results_are_not_placeholders() {
    let (_, mut dash) = dashboard(FakeApi::with_pages(vec![Ok(page_of("a", 0, None))]));
    let view = dash.search("zzzz", FilterState::default()).await;
    assert!(view.records.is_empty());
    assert!(!view.has_more);
  }

  #[tokio::test]
  async fn transport_failure_yields_placeholders() {
    let (_, mut dash) = dashboard(FakeApi::with_pages(vec![Err(FetchError::Transport("dns".into()))]));
    let view = dash.search("cats", FilterState::default()).await;
    assert_eq!(view.records.len(), 12);
    assert!(view.records.iter().all(|r| r.placeholder));
    assert!(!view.has_more);
  }

  #[tokio::test]
  async fn load_more_without_cursor_is_no_more_results() {
    let (_, mut dash) = dashboard(FakeApi::with_pages(vec![Ok(page_of("a", 3, None))]));
    assert_eq!(dash.load_more().await.unwrap_err(), FetchError::NoMoreResults);
    dash.search("cats", FilterState::default()).await;
    assert_eq!(dash.load_more().await.unwrap_err(), FetchError::NoMoreResults);
  }

  #[tokio::test]
  async fn filter_change_requires_new_search() {
    let (_, mut dash) = dashboard(FakeApi::with_pages(vec![Ok(page_of("a", 12, Some("T1")))]));
    dash.search("cats", FilterState::default()).await;
    dash.update_filters(FilterState { order: SortOrder::Rating, ..FilterState::default() });
    assert_eq!(dash.load_more().await.unwrap_err(), FetchError::NoMoreResults);
  }

  // --- listings ---

  #[tokio::test]
  async fn trending_labels_records() {
    let api = FakeApi::with_pages(vec![Ok(page_of("t", 24, Some("MORE")))]);
    let listing = trending(&api, "us").await;
    assert_eq!(listing.label, "Trending");
    assert_eq!(listing.records.len(), 24);
    assert!(listing.records.iter().all(|r| r.category == "Trending"));
    assert_eq!(api.seen()[0].get("regionCode"), Some("US"));
  }

  #[tokio::test]
  async fn trending_failure_uses_smaller_placeholder_batch() {
    let api = FakeApi::with_pages(vec![Err(FetchError::Upstream("quota".into()))]);
    let listing = trending(&api, "US").await;
    assert_eq!(listing.records.len(), 8);
    assert!(listing.records.iter().all(|r| r.placeholder));
  }

  #[tokio::test]
  async fn discover_fetches_each_niche_in_order() {
    let pages = (0..5).map(|i| Ok(page_of(&format!("n{}", i), 8, None))).collect();
    let api = FakeApi::with_pages(pages);
    let listings = discover(&api).await;
    let labels: Vec<_> = listings.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, ["Entertainment", "Sports", "Business", "Artificial Intelligence", "Science"]);
    assert!(listings.iter().all(|l| l.records.len() == 8));
    let queries: Vec<_> = api.seen().iter().map(|p| p.get("q").unwrap_or_default().to_string()).collect();
    assert_eq!(queries[3], "Artificial Intelligence");
  }

  // --- categories / suggestions ---

  #[tokio::test]
  async fn category_list_prepends_all() {
    let api = FakeApi { categories: Ok(vec![Category::new("1", "Film")]), ..FakeApi::with_pages(vec![]) };
    let cats = category_list(&api, "US").await;
    assert_eq!(cats, vec![Category::all(), Category::new("1", "Film")]);
  }

  #[tokio::test]
  async fn category_list_falls_back_to_defaults() {
    let api = FakeApi { categories: Err(FetchError::Transport("down".into())), ..FakeApi::with_pages(vec![]) };
    assert_eq!(category_list(&api, "US").await, Category::defaults());
    let api = FakeApi::with_pages(vec![]);
    assert_eq!(category_list(&api, "US").await, Category::defaults());
  }

  #[tokio::test]
  async fn suggest_blank_is_empty() {
    let api = FakeApi { suggestions: Ok(vec!["never".into()]), ..FakeApi::with_pages(vec![]) };
    assert!(suggest(&api, "   ").await.is_empty());
  }

  #[tokio::test]
  async fn suggest_passes_through_and_caps() {
    let many: Vec<String> = (0..20).map(|i| format!("rust {}", i)).collect();
    let api = FakeApi { suggestions: Ok(many), ..FakeApi::with_pages(vec![]) };
    let list = suggest(&api, "rust").await;
    assert_eq!(list.len(), constants().max_suggestions);
    assert_eq!(list[0], "rust 0");
  }

  #[tokio::test]
  async fn suggest_failure_uses_generic_completions() {
    let api = FakeApi { suggestions: Err(FetchError::Upstream("cors".into())), ..FakeApi::with_pages(vec![]) };
    let list = suggest(&api, "rust").await;
    assert_eq!(list.len(), 5);
    assert_eq!(list[0], "rust tutorial");
    assert_eq!(list[3], "best rust");
  }
}
