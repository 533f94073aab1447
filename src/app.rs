use chrono::Utc;
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use tubedash::analytics::{Summary, summarize};
use tubedash::constants::constants;
use tubedash::error::FetchError;
use tubedash::filters::{ActiveFilter, Category, DatePreset, DurationRange, FilterState, REGIONS};
use tubedash::normalize::VideoRecord;
use tubedash::scroll::{Debounce, ProximityTrigger};
use tubedash::service::{self, Listing};
use tubedash::session::{Page, PageRequest, SearchSession, fetch_page};
use tubedash::youtube::VideoApi;

use crate::config::Config;
use crate::theme::{THEMES, theme_index};

// --- Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Discover,
  Search,
  Trending,
  Analytics,
}

impl Tab {
  pub const ALL: [Tab; 4] = [Tab::Discover, Tab::Search, Tab::Trending, Tab::Analytics];

  pub fn label(self) -> &'static str {
    match self {
      Tab::Discover => "Discover",
      Tab::Search => "Search",
      Tab::Trending => "Trending",
      Tab::Analytics => "Analytics",
    }
  }

  pub fn index(self) -> usize {
    Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
  }

  pub fn next(self) -> Self {
    Self::ALL[(self.index() + 1) % Self::ALL.len()]
  }

  pub fn prev(self) -> Self {
    Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
  }

  /// Whether the tab shows a list of videos.
  pub fn is_list(self) -> bool {
    self != Tab::Analytics
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Results,
  /// Free-text narrowing of the visible list.
  Filter,
  /// Search constraints (date, duration, category, ...).
  Panel,
}

/// Duration slider stops offered by the filter panel, in minutes.
pub const DURATION_PRESETS: [(u32, u32); 4] = [(0, 60), (0, 3), (4, 20), (21, 60)];
pub const VIEW_STEPS: [u64; 5] = [0, 1_000, 10_000, 100_000, 1_000_000];
pub const LIKE_STEPS: [u64; 4] = [0, 100, 1_000, 10_000];
pub const COMMENT_STEPS: [u64; 4] = [0, 10, 100, 1_000];

/// Next value after `current` in `steps`, wrapping; unknown values restart at the first step.
fn next_step<T: Copy + PartialEq>(steps: &[T], current: T) -> T {
  match steps.iter().position(|s| *s == current) {
    Some(i) => steps[(i + 1) % steps.len()],
    None => steps[0],
  }
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) page_rx: Option<(PageRequest, oneshot::Receiver<Result<Page, FetchError>>)>,
  pub(crate) trending_rx: Option<oneshot::Receiver<Listing>>,
  pub(crate) discover_rx: Option<oneshot::Receiver<Vec<Listing>>>,
  pub(crate) categories_rx: Option<oneshot::Receiver<Vec<Category>>>,
  /// Tagged with the input the suggestions were requested for.
  pub(crate) suggest_rx: Option<(String, oneshot::Receiver<Vec<String>>)>,
}

enum Polled<T> {
  Ready(T),
  Pending,
  Closed,
}

fn poll_rx<T>(rx: &mut oneshot::Receiver<T>) -> Polled<T> {
  match rx.try_recv() {
    Ok(value) => Polled::Ready(value),
    Err(oneshot::error::TryRecvError::Empty) => Polled::Pending,
    Err(oneshot::error::TryRecvError::Closed) => Polled::Closed,
  }
}

pub struct App {
  api: Arc<dyn VideoApi>,
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  pub tab: Tab,
  pub theme_index: usize,
  pub session: SearchSession,
  /// Constraints being edited in the panel; pushed into the session on change.
  pub filters: FilterState,
  pub date_preset: DatePreset,
  pub categories: Vec<Category>,
  pub trending: Vec<VideoRecord>,
  pub discover: Vec<Listing>,
  pub list_state: ListState,
  /// Rows of the result list visible in the last frame.
  pub viewport_rows: usize,
  /// Filter text for narrowing the visible list by title/channel.
  pub filter: String,
  pub filter_cursor: usize,
  pub filter_scroll: usize,
  /// Indices into the current tab's records that pass the filter.
  pub filtered_indices: Vec<usize>,
  pub suggestions: Vec<String>,
  pub suggestion_index: Option<usize>,
  debounce: Debounce,
  proximity: ProximityTrigger,
  frame: u64,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message, lower priority than status/error.
  pub info_message: Option<String>,
  pub should_quit: bool,
  pub(crate) tasks: AsyncTasks,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(api: Arc<dyn VideoApi>, config: &Config, region: &str) -> Self {
    let filters = FilterState::with_region(region);
    Self {
      api,
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      mode: AppMode::Input,
      tab: Tab::Discover,
      theme_index: theme_index(config.theme_name.as_deref()),
      session: SearchSession::new(filters.clone()),
      filters,
      date_preset: DatePreset::Any,
      categories: Category::defaults(),
      trending: Vec::new(),
      discover: Vec::new(),
      list_state: ListState::default(),
      viewport_rows: 0,
      filter: String::new(),
      filter_cursor: 0,
      filter_scroll: 0,
      filtered_indices: Vec::new(),
      suggestions: Vec::new(),
      suggestion_index: None,
      debounce: Debounce::new(Duration::from_millis(constants().suggest_debounce_ms)),
      proximity: ProximityTrigger::new(constants().scroll_threshold_rows),
      frame: 0,
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      tasks: AsyncTasks::default(),
      error_time: None,
    }
  }

  /// Kick off the startup loads; with an initial query, open straight on the search tab.
  pub fn start(&mut self, initial_query: Option<&str>) {
    self.trigger_categories();
    self.trigger_discover();
    if let Some(query) = initial_query.map(str::trim).filter(|q| !q.is_empty()) {
      self.input = query.to_string();
      self.cursor_position = self.input.chars().count();
      self.trigger_search();
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    &THEMES[self.theme_index % THEMES.len()]
  }

  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.clear_error();
    }
  }

  fn save_config(&self) {
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.region_code = Some(self.filters.region_code.clone());
    config.save();
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  // --- Records ---

  /// Records behind the current tab, in display order.
  pub fn tab_records(&self) -> Vec<&VideoRecord> {
    match self.tab {
      Tab::Discover => self.discover.iter().flat_map(|l| l.records.iter()).collect(),
      Tab::Search => self.session.records().iter().collect(),
      Tab::Trending => self.trending.iter().collect(),
      Tab::Analytics => Vec::new(),
    }
  }

  /// The record under the cursor, after filtering.
  pub fn selected_record(&self) -> Option<&VideoRecord> {
    let pos = self.list_state.selected()?;
    let idx = *self.filtered_indices.get(pos)?;
    self.tab_records().get(idx).copied()
  }

  /// Metrics over everything loaded in any tab.
  pub fn summary(&self) -> Summary {
    let discover = self.discover.iter().flat_map(|l| l.records.iter());
    summarize(self.session.records().iter().chain(self.trending.iter()).chain(discover), 5)
  }

  /// Case-insensitive match of `filter` against title and channel name.
  pub fn matches_filter(record: &VideoRecord, filter: &str) -> bool {
    if filter.is_empty() {
      return true;
    }
    let needle = filter.to_lowercase();
    record.title.to_lowercase().contains(&needle) || record.channel_name.to_lowercase().contains(&needle)
  }

  /// Rebuild `filtered_indices` for the current tab and clamp the selection.
  pub fn recompute_filter(&mut self) {
    let filtered: Vec<usize> = self
      .tab_records()
      .iter()
      .enumerate()
      .filter(|(_, r)| Self::matches_filter(r, &self.filter) && self.filters.admits(r))
      .map(|(i, _)| i)
      .collect();
    self.filtered_indices = filtered;
    if self.filtered_indices.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      if sel >= self.filtered_indices.len() {
        self.list_state.select(Some(self.filtered_indices.len() - 1));
      } else {
        self.list_state.select(Some(sel));
      }
    }
  }

  pub fn set_tab(&mut self, tab: Tab) {
    if self.tab == tab {
      return;
    }
    debug!(tab = tab.label(), "ui: tab switched");
    self.tab = tab;
    self.list_state = ListState::default();
    self.recompute_filter();
    if tab == Tab::Trending && self.trending.is_empty() && self.tasks.trending_rx.is_none() {
      self.trigger_trending();
    }
  }

  pub fn select_next(&mut self) {
    let count = self.filtered_indices.len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1).min(count - 1));
      self.list_state.select(Some(i));
    }
  }

  pub fn select_prev(&mut self) {
    if !self.filtered_indices.is_empty() {
      let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
      self.list_state.select(Some(i));
    }
  }

  // --- Filters ---

  /// Push the panel's filters into the session. A constraint change invalidates
  /// the cursor, so a started search (even one for the default term) is
  /// restarted from its first page with the new filters.
  fn apply_filters(&mut self) {
    let before = self.session.generation();
    self.session.update_filters(self.filters.clone());
    self.recompute_filter();
    if self.session.generation() != before && self.session.has_started() {
      let term = self.session.term().to_string();
      self.start_search(&term);
    }
  }

  pub fn cycle_date(&mut self) {
    self.date_preset = self.date_preset.next();
    self.filters.date_range = self.date_preset.range(Utc::now());
    self.apply_filters();
  }

  pub fn cycle_duration(&mut self) {
    let current = (self.filters.duration.min(), self.filters.duration.max());
    let (min, max) = next_step(&DURATION_PRESETS, current);
    self.filters.duration = DurationRange::new(min, max);
    self.apply_filters();
  }

  pub fn cycle_category(&mut self) {
    let idx = self.categories.iter().position(|c| c.id == self.filters.category);
    let next = match idx {
      Some(i) => (i + 1) % self.categories.len().max(1),
      None => 0,
    };
    if let Some(category) = self.categories.get(next) {
      self.filters.category = category.id.clone();
      self.apply_filters();
    }
  }

  pub fn cycle_order(&mut self) {
    self.filters.order = self.filters.order.next();
    self.apply_filters();
  }

  pub fn cycle_region(&mut self) {
    let codes: Vec<&str> = REGIONS.iter().map(|(code, _)| *code).collect();
    self.filters.region_code = next_step(&codes, self.filters.region_code.as_str()).to_string();
    self.apply_filters();
    self.trending.clear();
    self.trigger_categories();
    if self.tab == Tab::Trending {
      self.trigger_trending();
    }
    self.save_config();
  }

  pub fn cycle_min_views(&mut self) {
    self.filters.min_views = next_step(&VIEW_STEPS, self.filters.min_views);
    self.apply_filters();
  }

  pub fn cycle_min_likes(&mut self) {
    self.filters.min_likes = next_step(&LIKE_STEPS, self.filters.min_likes);
    self.apply_filters();
  }

  pub fn cycle_min_comments(&mut self) {
    self.filters.min_comments = next_step(&COMMENT_STEPS, self.filters.min_comments);
    self.apply_filters();
  }

  /// Drop the most recently listed active filter chip.
  pub fn remove_last_filter(&mut self) {
    let Some(last) = self.filters.active_filters().pop() else { return };
    if last == ActiveFilter::Date {
      self.date_preset = DatePreset::Any;
    }
    self.filters.remove(last);
    self.apply_filters();
  }

  pub fn reset_filters(&mut self) {
    self.filters.reset();
    self.date_preset = DatePreset::Any;
    self.apply_filters();
  }

  /// Name of the selected category for display.
  pub fn category_name(&self) -> &str {
    self.categories.iter().find(|c| c.id == self.filters.category).map_or(self.filters.category.as_str(), |c| c.name.as_str())
  }

  // --- Suggestions ---

  /// Note an edit of the search box; suggestions are fetched once typing pauses.
  pub fn input_changed(&mut self) {
    self.suggestion_index = None;
    if self.input.trim().chars().count() >= constants().suggest_min_chars {
      self.debounce.poke(Instant::now());
    } else {
      self.debounce.cancel();
      self.suggestions.clear();
      self.tasks.suggest_rx = None;
    }
  }

  pub fn cycle_suggestion(&mut self) {
    if self.suggestions.is_empty() {
      return;
    }
    let next = self.suggestion_index.map_or(0, |i| (i + 1) % self.suggestions.len());
    self.suggestion_index = Some(next);
  }

  /// Replace the input with the highlighted suggestion, if any.
  pub fn accept_suggestion(&mut self) -> bool {
    let Some(choice) = self.suggestion_index.and_then(|i| self.suggestions.get(i)).cloned() else { return false };
    self.input = choice;
    self.cursor_position = self.input.chars().count();
    self.suggestions.clear();
    self.suggestion_index = None;
    self.debounce.cancel();
    true
  }

  fn trigger_suggest(&mut self) {
    let partial = self.input.trim().to_string();
    let api = Arc::clone(&self.api);
    let (tx, rx) = oneshot::channel();
    let query = partial.clone();
    tokio::spawn(async move {
      let _ = tx.send(service::suggest(api.as_ref(), &query).await);
    });
    self.tasks.suggest_rx = Some((partial, rx));
  }

  // --- Async triggers ---

  /// Start a new search for the text in the search box.
  pub fn trigger_search(&mut self) {
    let term = self.input.trim().to_string();
    self.suggestions.clear();
    self.suggestion_index = None;
    self.debounce.cancel();
    self.filters.search_term = term.clone();
    self.start_search(&term);
    self.set_tab(Tab::Search);
    self.list_state = ListState::default();
    self.mode = AppMode::Results;
  }

  fn start_search(&mut self, term: &str) {
    self.clear_error();
    let request = self.session.begin_search(term, self.filters.clone());
    info!(query = %term, generation = request.generation, "search triggered");
    self.status_message =
      Some(format!("Searching '{}'…", if term.is_empty() { constants().default_search_term.as_str() } else { term }));
    self.spawn_page(request);
    self.recompute_filter();
  }

  /// Request the next page of the current search. A missing cursor is not an
  /// error for the user; the scroll simply ends.
  pub fn trigger_load_more(&mut self) {
    match self.session.begin_next_page() {
      Ok(Some(request)) => {
        self.info_message = Some("Loading more…".to_string());
        self.spawn_page(request);
      }
      Ok(None) => {}
      Err(e) => debug!(err = %e, "search: load more ignored"),
    }
  }

  fn spawn_page(&mut self, request: PageRequest) {
    let api = Arc::clone(&self.api);
    let params = request.params.clone();
    let label = request.label.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(fetch_page(api.as_ref(), &params, &label, Utc::now()).await);
    });
    self.tasks.page_rx = Some((request, rx));
  }

  fn trigger_trending(&mut self) {
    let api = Arc::clone(&self.api);
    let region = self.filters.region_code.clone();
    self.status_message = Some("Loading trending…".to_string());
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(service::trending(api.as_ref(), &region).await);
    });
    self.tasks.trending_rx = Some(rx);
  }

  fn trigger_discover(&mut self) {
    let api = Arc::clone(&self.api);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(service::discover(api.as_ref()).await);
    });
    self.tasks.discover_rx = Some(rx);
  }

  fn trigger_categories(&mut self) {
    let api = Arc::clone(&self.api);
    let region = self.filters.region_code.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(service::category_list(api.as_ref(), &region).await);
    });
    self.tasks.categories_rx = Some(rx);
  }

  // --- Per-frame work ---

  /// Fold finished background tasks into the app state.
  pub fn check_pending(&mut self) {
    if let Some((request, mut rx)) = self.tasks.page_rx.take() {
      match poll_rx(&mut rx) {
        Polled::Ready(outcome) => {
          self.status_message = None;
          self.info_message = None;
          if let Some(view) = self.session.complete(&request, outcome) {
            if view.records.is_empty() && self.session.records().is_empty() {
              self.set_error("No results found.".to_string());
            } else if view.records.iter().any(|r| r.placeholder) {
              self.set_error("Could not reach YouTube; showing placeholders.".to_string());
            }
            self.recompute_filter();
          }
        }
        Polled::Pending => self.tasks.page_rx = Some((request, rx)),
        Polled::Closed => {
          self.status_message = None;
          self.info_message = None;
          self.session.complete(&request, Err(FetchError::Transport("search task failed".to_string())));
          self.recompute_filter();
        }
      }
    }

    if let Some(mut rx) = self.tasks.trending_rx.take() {
      match poll_rx(&mut rx) {
        Polled::Ready(listing) => {
          self.status_message = None;
          self.trending = listing.records;
          if self.tab == Tab::Trending {
            self.recompute_filter();
          }
        }
        Polled::Pending => self.tasks.trending_rx = Some(rx),
        Polled::Closed => {
          self.status_message = None;
          self.set_error("Trending task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.discover_rx.take() {
      match poll_rx(&mut rx) {
        Polled::Ready(listings) => {
          self.discover = listings;
          if self.tab == Tab::Discover {
            self.recompute_filter();
          }
        }
        Polled::Pending => self.tasks.discover_rx = Some(rx),
        Polled::Closed => self.set_error("Discover task failed.".to_string()),
      }
    }

    if let Some(mut rx) = self.tasks.categories_rx.take() {
      match poll_rx(&mut rx) {
        Polled::Ready(categories) => {
          if !categories.iter().any(|c| c.id == self.filters.category) {
            warn!(category = %self.filters.category, "categories: selection not offered in region");
          }
          self.categories = categories;
        }
        Polled::Pending => self.tasks.categories_rx = Some(rx),
        Polled::Closed => {}
      }
    }

    if let Some((asked, mut rx)) = self.tasks.suggest_rx.take() {
      match poll_rx(&mut rx) {
        Polled::Ready(list) => {
          if asked == self.input.trim() && self.mode == AppMode::Input {
            self.suggestions = list;
            self.suggestion_index = None;
          } else {
            debug!(asked = %asked, "suggest: input changed, dropping results");
          }
        }
        Polled::Pending => self.tasks.suggest_rx = Some((asked, rx)),
        Polled::Closed => {}
      }
    }
  }

  /// Timers that run once per frame: error expiry, the suggestion debounce and
  /// the scroll proximity trigger.
  pub fn tick(&mut self) {
    self.frame = self.frame.wrapping_add(1);
    self.expire_error();

    if self.debounce.ready(Instant::now()) && self.mode == AppMode::Input {
      self.trigger_suggest();
    }

    if self.tab == Tab::Search && self.viewport_rows > 0 {
      let shown = self.filtered_indices.len();
      let remaining = shown.saturating_sub(self.list_state.offset() + self.viewport_rows);
      if self.proximity.should_fire(self.frame, remaining, self.session.is_pending(), self.session.has_more()) {
        self.trigger_load_more();
      }
    }
  }
}
