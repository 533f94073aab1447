//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // YouTube Data API
  pub api_base_url: String,
  pub suggest_url: String,
  pub request_timeout_secs: u64,

  // Search / pagination
  pub default_search_term: String,
  pub search_page_size: u32,
  pub trending_page_size: u32,
  pub niche_page_size: u32,
  pub niches: Vec<String>,

  // Placeholders
  pub placeholder_batch_size: usize,
  pub trending_placeholder_size: usize,
  pub placeholder_thumbnail: String,
  pub avatar_url_template: String,

  // Filter defaults
  pub default_region: String,
  pub max_duration_minutes: u32,

  // UI
  pub scroll_threshold_rows: usize,
  pub suggest_debounce_ms: u64,
  pub suggest_min_chars: usize,
  pub max_suggestions: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

/// Avatar URL for a channel, seeded by its display name.
pub fn avatar_url(seed: &str) -> String {
  constants().avatar_url_template.replace("{seed}", &seed.replace(' ', "%20"))
}
