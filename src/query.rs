//! Maps search text and filter state onto search-endpoint parameters.
//!
//! Everything here is pure: no I/O, no clock, no API key. The client adds the key
//! when the request is sent.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::constants::constants;
use crate::filters::{ALL_CATEGORIES, DurationBucket, FilterState, SortOrder};

/// Ordered query parameters for the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchParams {
  pairs: Vec<(&'static str, String)>,
}

impl SearchParams {
  fn push(&mut self, key: &'static str, value: impl Into<String>) {
    self.pairs.push((key, value.into()));
  }

  /// Value of the first parameter named `key`.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
  }

  pub fn pairs(&self) -> &[(&'static str, String)] {
    &self.pairs
  }

  /// The same request continued from `token`. Any previous token is replaced.
  pub fn with_page_token(mut self, token: &str) -> Self {
    self.pairs.retain(|(k, _)| *k != "pageToken");
    self.push("pageToken", token);
    self
  }
}

/// The term actually sent upstream: trimmed, or the default term when blank.
pub fn effective_term(term: &str) -> &str {
  let trimmed = term.trim();
  if trimmed.is_empty() { constants().default_search_term.as_str() } else { trimmed }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn base_params(term: &str, max_results: u32) -> SearchParams {
  let mut params = SearchParams::default();
  params.push("part", "snippet");
  params.push("type", "video");
  params.push("maxResults", max_results.to_string());
  params.push("q", effective_term(term));
  params
}

/// Build first-page search parameters for `term` under `filters`.
pub fn build_search_params(term: &str, filters: &FilterState) -> SearchParams {
  let mut params = base_params(term, constants().search_page_size);

  if let Some((from, to)) = filters.date_range.bounds() {
    params.push("publishedAfter", rfc3339(from));
    params.push("publishedBefore", rfc3339(to));
  }

  let bucket = filters.duration.bucket();
  if bucket != DurationBucket::Any {
    params.push("videoDuration", bucket.as_param());
  }

  if !filters.category.is_empty() && filters.category != ALL_CATEGORIES {
    params.push("videoCategoryId", filters.category.as_str());
  }

  if !filters.region_code.is_empty() && filters.region_code != constants().default_region {
    params.push("regionCode", filters.region_code.as_str());
  }

  if filters.order != SortOrder::Relevance {
    params.push("order", filters.order.as_param());
  }

  params
}

/// Parameters for the trending listing in `region`.
pub fn trending_params(region: &str) -> SearchParams {
  let mut params = base_params("trending", constants().trending_page_size);
  params.push("relevanceLanguage", "en");
  if !region.is_empty() {
    params.push("regionCode", region.to_uppercase());
  }
  params
}

/// Parameters for a plain keyword listing, e.g. a discover niche.
pub fn listing_params(term: &str, max_results: u32) -> SearchParams {
  base_params(term, max_results)
}
