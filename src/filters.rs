use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::constants::constants;
use crate::format::format_minutes;
use crate::normalize::VideoRecord;

/// Sentinel category id meaning "no category constraint".
pub const ALL_CATEGORIES: &str = "all";

/// Built-in category table, used until (or instead of) the live category listing.
pub const DEFAULT_CATEGORIES: [(&str, &str); 9] = [
  ("10", "Music"),
  ("20", "Gaming"),
  ("22", "People & Blogs"),
  ("23", "Comedy"),
  ("24", "Entertainment"),
  ("25", "News & Politics"),
  ("26", "How-to & Style"),
  ("27", "Education"),
  ("28", "Science & Technology"),
];

/// Regions offered by the filter panel.
pub const REGIONS: [(&str, &str); 10] = [
  ("US", "United States"),
  ("GB", "United Kingdom"),
  ("CA", "Canada"),
  ("AU", "Australia"),
  ("IN", "India"),
  ("JP", "Japan"),
  ("KR", "South Korea"),
  ("BR", "Brazil"),
  ("DE", "Germany"),
  ("FR", "France"),
];

/// A selectable video category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
  pub id: String,
  pub name: String,
}

impl Category {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self { id: id.into(), name: name.into() }
  }

  pub fn all() -> Self {
    Self::new(ALL_CATEGORIES, "All Categories")
  }

  /// `All Categories` followed by the built-in table.
  pub fn defaults() -> Vec<Category> {
    std::iter::once(Self::all()).chain(DEFAULT_CATEGORIES.iter().map(|(id, name)| Self::new(*id, *name))).collect()
  }
}

/// Coarse duration categories the search endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
  Any,
  Short,
  Medium,
  Long,
}

impl DurationBucket {
  pub fn as_param(self) -> &'static str {
    match self {
      DurationBucket::Any => "any",
      DurationBucket::Short => "short",
      DurationBucket::Medium => "medium",
      DurationBucket::Long => "long",
    }
  }
}

/// Inclusive minute range chosen on the duration slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
  min: u32,
  max: u32,
}

impl DurationRange {
  /// Build a range clamped to `0..=max_duration_minutes`, swapping inverted bounds.
  pub fn new(min: u32, max: u32) -> Self {
    let cap = constants().max_duration_minutes;
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    Self { min: lo.min(cap), max: hi.min(cap) }
  }

  pub fn full() -> Self {
    Self::new(0, constants().max_duration_minutes)
  }

  pub fn min(self) -> u32 {
    self.min
  }

  pub fn max(self) -> u32 {
    self.max
  }

  /// Reduce the range to exactly one bucket. Thresholds are inclusive and ties
  /// resolve toward the narrower bucket.
  pub fn bucket(self) -> DurationBucket {
    if self.min == 0 && self.max >= constants().max_duration_minutes {
      DurationBucket::Any
    } else if self.min == 0 && self.max < 4 {
      DurationBucket::Short
    } else if self.max <= 20 {
      DurationBucket::Medium
    } else {
      DurationBucket::Long
    }
  }

  pub fn label(self) -> String {
    format!("{} – {}", format_minutes(self.min), format_minutes(self.max))
  }
}

impl Default for DurationRange {
  fn default() -> Self {
    Self::full()
  }
}

/// Result ordering requested from the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  #[default]
  Relevance,
  Date,
  ViewCount,
  Rating,
}

impl SortOrder {
  pub const ALL: [SortOrder; 4] = [SortOrder::Relevance, SortOrder::Date, SortOrder::ViewCount, SortOrder::Rating];

  pub fn as_param(self) -> &'static str {
    match self {
      SortOrder::Relevance => "relevance",
      SortOrder::Date => "date",
      SortOrder::ViewCount => "viewCount",
      SortOrder::Rating => "rating",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortOrder::Relevance => "Relevance",
      SortOrder::Date => "Upload Date",
      SortOrder::ViewCount => "View Count",
      SortOrder::Rating => "Rating",
    }
  }

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

/// Publish-date window. Only sent upstream when both ends are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
  pub from: Option<DateTime<Utc>>,
  pub to: Option<DateTime<Utc>>,
}

impl DateRange {
  /// The window covering the last `days` days up to `now`.
  pub fn last_days(days: i64, now: DateTime<Utc>) -> Self {
    Self { from: Some(now - Duration::days(days)), to: Some(now) }
  }

  /// Both endpoints, when the range is complete.
  pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    self.from.zip(self.to)
  }
}

/// Date presets offered by the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreset {
  #[default]
  Any,
  PastWeek,
  PastMonth,
  PastYear,
}

impl DatePreset {
  pub const ALL: [DatePreset; 4] = [DatePreset::Any, DatePreset::PastWeek, DatePreset::PastMonth, DatePreset::PastYear];

  pub fn label(self) -> &'static str {
    match self {
      DatePreset::Any => "Any time",
      DatePreset::PastWeek => "Past week",
      DatePreset::PastMonth => "Past month",
      DatePreset::PastYear => "Past year",
    }
  }

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  pub fn range(self, now: DateTime<Utc>) -> DateRange {
    match self {
      DatePreset::Any => DateRange::default(),
      DatePreset::PastWeek => DateRange::last_days(7, now),
      DatePreset::PastMonth => DateRange::last_days(30, now),
      DatePreset::PastYear => DateRange::last_days(365, now),
    }
  }
}

/// A filter chip that is currently constraining results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
  Date,
  Duration,
  Category,
  Views,
  Likes,
  Comments,
  Order,
  Region,
}

impl ActiveFilter {
  pub fn label(self) -> &'static str {
    match self {
      ActiveFilter::Date => "date",
      ActiveFilter::Duration => "duration",
      ActiveFilter::Category => "category",
      ActiveFilter::Views => "views",
      ActiveFilter::Likes => "likes",
      ActiveFilter::Comments => "comments",
      ActiveFilter::Order => "order",
      ActiveFilter::Region => "region",
    }
  }
}

/// User-adjustable search constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  pub search_term: String,
  pub date_range: DateRange,
  pub duration: DurationRange,
  pub category: String,
  pub min_views: u64,
  pub min_likes: u64,
  pub min_comments: u64,
  pub order: SortOrder,
  pub region_code: String,
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      search_term: String::new(),
      date_range: DateRange::default(),
      duration: DurationRange::full(),
      category: ALL_CATEGORIES.to_string(),
      min_views: 0,
      min_likes: 0,
      min_comments: 0,
      order: SortOrder::default(),
      region_code: constants().default_region.clone(),
    }
  }
}

impl FilterState {
  /// Defaults with the given region instead of the built-in one.
  pub fn with_region(region_code: &str) -> Self {
    Self { region_code: region_code.to_uppercase(), ..Self::default() }
  }

  /// Whether every field except the search term matches `other`.
  pub fn same_constraints(&self, other: &FilterState) -> bool {
    let a = FilterState { search_term: String::new(), ..self.clone() };
    let b = FilterState { search_term: String::new(), ..other.clone() };
    a == b
  }

  /// Filters differing from their defaults, in display order.
  pub fn active_filters(&self) -> Vec<ActiveFilter> {
    let defaults = FilterState::default();
    let mut active = Vec::new();
    if self.date_range.bounds().is_some() {
      active.push(ActiveFilter::Date);
    }
    if self.duration != defaults.duration {
      active.push(ActiveFilter::Duration);
    }
    if self.category != ALL_CATEGORIES {
      active.push(ActiveFilter::Category);
    }
    if self.min_views > 0 {
      active.push(ActiveFilter::Views);
    }
    if self.min_likes > 0 {
      active.push(ActiveFilter::Likes);
    }
    if self.min_comments > 0 {
      active.push(ActiveFilter::Comments);
    }
    if self.order != SortOrder::Relevance {
      active.push(ActiveFilter::Order);
    }
    if self.region_code != defaults.region_code {
      active.push(ActiveFilter::Region);
    }
    active
  }

  /// Reset a single filter to its default.
  pub fn remove(&mut self, filter: ActiveFilter) {
    let defaults = FilterState::default();
    match filter {
      ActiveFilter::Date => self.date_range = defaults.date_range,
      ActiveFilter::Duration => self.duration = defaults.duration,
      ActiveFilter::Category => self.category = defaults.category,
      ActiveFilter::Views => self.min_views = 0,
      ActiveFilter::Likes => self.min_likes = 0,
      ActiveFilter::Comments => self.min_comments = 0,
      ActiveFilter::Order => self.order = defaults.order,
      ActiveFilter::Region => self.region_code = defaults.region_code,
    }
  }

  /// Reset every filter, keeping the search term.
  pub fn reset(&mut self) {
    *self = FilterState { search_term: std::mem::take(&mut self.search_term), ..FilterState::default() };
  }

  /// Client-side engagement minimums; the search endpoint has no such parameters.
  pub fn admits(&self, record: &VideoRecord) -> bool {
    record.view_count >= self.min_views && record.like_count >= self.min_likes && record.comment_count >= self.min_comments
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  // --- DurationRange::bucket ---

  #[test]
  fn bucket_documented_cases() {
    assert_eq!(DurationRange::new(0, 60).bucket(), DurationBucket::Any);
    assert_eq!(DurationRange::new(0, 3).bucket(), DurationBucket::Short);
    assert_eq!(DurationRange::new(0, 20).bucket(), DurationBucket::Medium);
    assert_eq!(DurationRange::new(0, 21).bucket(), DurationBucket::Long);
  }

  #[test]
  fn bucket_ties_resolve_narrower() {
    assert_eq!(DurationRange::new(0, 4).bucket(), DurationBucket::Medium);
    assert_eq!(DurationRange::new(4, 20).bucket(), DurationBucket::Medium);
    assert_eq!(DurationRange::new(0, 0).bucket(), DurationBucket::Short);
  }

  #[test]
  fn bucket_nonzero_min() {
    assert_eq!(DurationRange::new(2, 3).bucket(), DurationBucket::Medium);
    assert_eq!(DurationRange::new(5, 60).bucket(), DurationBucket::Long);
    assert_eq!(DurationRange::new(30, 40).bucket(), DurationBucket::Long);
  }

  #[test]
  fn bucket_is_total_over_valid_ranges() {
    for min in 0..=60 {
      for max in min..=60 {
        let bucket = DurationRange::new(min, max).bucket();
        assert_eq!(bucket == DurationBucket::Any, min == 0 && max == 60, "[{min},{max}] -> {bucket:?}");
      }
    }
  }

  #[test]
  fn duration_range_clamps_and_orders() {
    let r = DurationRange::new(90, 10);
    assert_eq!((r.min(), r.max()), (10, 60));
  }

  // --- active filters ---

  #[test]
  fn defaults_have_no_active_filters() {
    assert!(FilterState::default().active_filters().is_empty());
  }

  #[test]
  fn active_filters_track_changes() {
    let mut f = FilterState::default();
    f.min_views = 1_000;
    f.order = SortOrder::Date;
    f.category = "10".to_string();
    assert_eq!(f.active_filters(), vec![ActiveFilter::Category, ActiveFilter::Views, ActiveFilter::Order]);

    f.remove(ActiveFilter::Views);
    assert_eq!(f.min_views, 0);
    assert_eq!(f.active_filters(), vec![ActiveFilter::Category, ActiveFilter::Order]);
  }

  #[test]
  fn half_open_date_range_is_not_active() {
    let mut f = FilterState::default();
    f.date_range.from = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert!(f.active_filters().is_empty());
  }

  #[test]
  fn reset_keeps_search_term() {
    let mut f = FilterState { search_term: "cats".to_string(), min_likes: 5, ..FilterState::default() };
    f.region_code = "JP".to_string();
    f.reset();
    assert_eq!(f.search_term, "cats");
    assert_eq!(f, FilterState { search_term: "cats".to_string(), ..FilterState::default() });
  }

  #[test]
  fn same_constraints_ignores_search_term() {
    let a = FilterState { search_term: "cats".to_string(), ..FilterState::default() };
    let b = FilterState { search_term: "dogs".to_string(), ..FilterState::default() };
    assert!(a.same_constraints(&b));
    let c = FilterState { min_comments: 1, ..b.clone() };
    assert!(!a.same_constraints(&c));
  }

  #[test]
  fn sort_order_cycles() {
    assert_eq!(SortOrder::Rating.next(), SortOrder::Relevance);
    assert_eq!(SortOrder::Relevance.next(), SortOrder::Date);
  }

  #[test]
  fn category_defaults_start_with_all() {
    let cats = Category::defaults();
    assert_eq!(cats[0], Category::all());
    assert_eq!(cats.len(), DEFAULT_CATEGORIES.len() + 1);
  }
}
