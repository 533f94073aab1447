//! The paginated fetch loop for one logical search session.
//!
//! `SearchSession` is a synchronous state machine: `begin_*` hands out a
//! `PageRequest` tagged with the current generation, the caller performs the I/O
//! (`fetch_page`) wherever it likes, and `complete` folds the outcome back in.
//! Responses whose generation no longer matches are dropped on arrival.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::constants::constants;
use crate::error::FetchError;
use crate::filters::FilterState;
use crate::normalize::{VideoRecord, normalize, placeholders};
use crate::query::{SearchParams, build_search_params};
use crate::youtube::{RawVideo, VideoApi};

/// Opaque continuation token from the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
  First,
  Next,
}

/// A request handed out by the session; carry it back to `complete`.
#[derive(Debug, Clone)]
pub struct PageRequest {
  pub generation: u64,
  pub kind: PageKind,
  pub params: SearchParams,
  /// Category label stamped on the resulting records.
  pub label: String,
}

/// One normalized page plus the cursor for the page after it.
#[derive(Debug, Clone, Default)]
pub struct Page {
  pub records: Vec<VideoRecord>,
  pub cursor: Option<PageCursor>,
}

/// What the presentation layer sees after a page lands: the new batch and
/// whether another page can be requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
  pub records: Vec<VideoRecord>,
  pub has_more: bool,
}

#[derive(Debug, Default)]
pub struct SearchSession {
  term: String,
  filters: FilterState,
  cursor: Option<PageCursor>,
  generation: u64,
  in_flight: Option<u64>,
  records: Vec<VideoRecord>,
  started: bool,
}

impl SearchSession {
  pub fn new(filters: FilterState) -> Self {
    Self { filters, ..Self::default() }
  }

  pub fn term(&self) -> &str {
    &self.term
  }

  pub fn filters(&self) -> &FilterState {
    &self.filters
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// All records of the session so far, in arrival order.
  pub fn records(&self) -> &[VideoRecord] {
    &self.records
  }

  pub fn has_more(&self) -> bool {
    self.cursor.is_some()
  }

  pub fn is_pending(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Whether `begin_search` has run, including searches for the default term.
  pub fn has_started(&self) -> bool {
    self.started
  }

  fn label(&self) -> String {
    let term = self.term.trim();
    if term.is_empty() { "Search Results".to_string() } else { term.to_string() }
  }

  /// Label for placeholder batches: the term, or `Search` when there is none.
  fn fallback_label(&self) -> String {
    let term = self.term.trim();
    if term.is_empty() { "Search".to_string() } else { term.to_string() }
  }

  /// Start a new session: drop the cursor and records and request the first page.
  pub fn begin_search(&mut self, term: &str, filters: FilterState) -> PageRequest {
    self.generation += 1;
    self.started = true;
    self.term = term.trim().to_string();
    self.filters = filters;
    self.cursor = None;
    self.records.clear();
    self.in_flight = Some(self.generation);
    info!(query = %self.term, generation = self.generation, "search: first page requested");

    PageRequest {
      generation: self.generation,
      kind: PageKind::First,
      params: build_search_params(&self.term, &self.filters),
      label: self.label(),
    }
  }

  /// Request the page after the current cursor.
  ///
  /// `Err(NoMoreResults)` when no cursor is held; `Ok(None)` while another request
  /// is in flight (the call is ignored, not queued).
  pub fn begin_next_page(&mut self) -> Result<Option<PageRequest>, FetchError> {
    let Some(cursor) = self.cursor.as_ref() else { return Err(FetchError::NoMoreResults) };
    if self.in_flight.is_some() {
      debug!(generation = self.generation, "search: next page already pending");
      return Ok(None);
    }
    let params = build_search_params(&self.term, &self.filters).with_page_token(cursor.as_str());
    self.in_flight = Some(self.generation);
    debug!(generation = self.generation, records = self.records.len(), "search: next page requested");

    Ok(Some(PageRequest { generation: self.generation, kind: PageKind::Next, params, label: self.label() }))
  }

  /// Replace the filters. Any change other than the search term invalidates the
  /// cursor and every in-flight request.
  pub fn update_filters(&mut self, filters: FilterState) {
    if !self.filters.same_constraints(&filters) {
      self.generation += 1;
      self.cursor = None;
      self.in_flight = None;
      debug!(generation = self.generation, "search: filters changed, cursor dropped");
    }
    self.filters = filters;
  }

  /// Fold a finished request back into the session. Returns `None` when the
  /// request belongs to an older generation and was discarded.
  pub fn complete(&mut self, request: &PageRequest, outcome: Result<Page, FetchError>) -> Option<PageView> {
    if request.generation != self.generation {
      debug!(stale = request.generation, current = self.generation, "search: discarding stale response");
      return None;
    }
    if self.in_flight == Some(request.generation) {
      self.in_flight = None;
    }

    let batch = match outcome {
      Ok(page) => {
        self.cursor = page.cursor;
        page.records
      }
      Err(e) if e.is_degradable() => {
        warn!(err = %e, query = %self.term, kind = ?request.kind, "search: fetch failed, serving placeholders");
        self.cursor = None;
        placeholders(constants().placeholder_batch_size, &self.fallback_label())
      }
      Err(e) => {
        debug!(err = %e, "search: nothing to fetch");
        self.cursor = None;
        Vec::new()
      }
    };

    self.records.extend(batch.iter().cloned());
    info!(
      query = %self.term,
      batch = batch.len(),
      total = self.records.len(),
      has_more = self.has_more(),
      "search: page applied"
    );
    Some(PageView { records: batch, has_more: self.has_more() })
  }
}

/// Run one page request against the API: search summaries, then details, then
/// normalization. Zero summaries is a legitimate empty page; summaries without
/// any details is an upstream failure. Ids the details endpoint skipped are kept
/// as default-filled records so the batch length matches the listing.
pub async fn fetch_page(
  api: &dyn VideoApi,
  params: &SearchParams,
  label: &str,
  now: DateTime<Utc>,
) -> Result<Page, FetchError> {
  let listing = api.search(params).await?;
  let ids: Vec<String> =
    listing.items.into_iter().filter_map(|item| item.id.video_id).filter(|id| !id.is_empty()).collect();
  if ids.is_empty() {
    return Ok(Page::default());
  }

  let mut details = api.video_details(&ids).await?;
  if details.is_empty() {
    return Err(FetchError::Upstream(format!("details endpoint returned nothing for {} ids", ids.len())));
  }

  let records = ids
    .into_iter()
    .map(|id| match details.iter().position(|raw| raw.id == id) {
      Some(idx) => details.swap_remove(idx),
      None => RawVideo { id, ..RawVideo::default() },
    })
    .map(|raw| normalize(raw, label, now))
    .collect();

  let cursor = listing.next_page_token.filter(|t| !t.is_empty()).map(PageCursor::new);
  Ok(Page { records, cursor })
}
