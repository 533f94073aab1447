//! Aggregate metrics over the records currently loaded in the dashboard.

use std::collections::{HashMap, HashSet};

use crate::normalize::VideoRecord;

/// Totals for one channel or category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTotals {
  pub name: String,
  pub videos: usize,
  pub views: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
  pub videos: usize,
  pub total_views: u64,
  pub total_likes: u64,
  pub total_comments: u64,
  /// `(likes + comments) / views` across all videos, as a percentage.
  pub engagement_rate: f64,
  pub top_channels: Vec<GroupTotals>,
  pub categories: Vec<GroupTotals>,
}

fn group_by<'a>(records: &[&'a VideoRecord], key: impl Fn(&'a VideoRecord) -> &'a str) -> Vec<GroupTotals> {
  let mut groups: HashMap<&str, GroupTotals> = HashMap::new();
  for record in records {
    let name = key(*record);
    let entry = groups.entry(name).or_insert_with(|| GroupTotals { name: name.to_string(), videos: 0, views: 0 });
    entry.videos += 1;
    entry.views = entry.views.saturating_add(record.view_count);
  }
  let mut out: Vec<GroupTotals> = groups.into_values().collect();
  out.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.name.cmp(&b.name)));
  out
}

/// Summarize `records`, skipping placeholders and duplicate ids.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a VideoRecord>, top_n: usize) -> Summary {
  let mut seen = HashSet::new();
  let real: Vec<&VideoRecord> = records.into_iter().filter(|r| !r.placeholder && seen.insert(r.id.clone())).collect();
  if real.is_empty() {
    return Summary::default();
  }

  let total = |count: fn(&VideoRecord) -> u64| real.iter().fold(0u64, |acc, r| acc.saturating_add(count(r)));
  let total_views = total(|r| r.view_count);
  let total_likes = total(|r| r.like_count);
  let total_comments = total(|r| r.comment_count);
  let engagement_rate = if total_views == 0 {
    0.0
  } else {
    total_likes.saturating_add(total_comments) as f64 / total_views as f64 * 100.0
  };

  let mut top_channels = group_by(&real, |r| r.channel_name.as_str());
  top_channels.truncate(top_n);

  Summary {
    videos: real.len(),
    total_views,
    total_likes,
    total_comments,
    engagement_rate,
    top_channels,
    categories: group_by(&real, |r| r.category.as_str()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::placeholders;

  fn record(id: &str, channel: &str, category: &str, views: u64, likes: u64, comments: u64) -> VideoRecord {
    VideoRecord {
      id: id.to_string(),
      channel_name: channel.to_string(),
      category: category.to_string(),
      view_count: views,
      like_count: likes,
      comment_count: comments,
      placeholder: false,
      ..placeholders(1, category).remove(0)
    }
  }

  #[test]
  fn empty_input() {
    assert_eq!(summarize(&[], 5), Summary::default());
  }

  #[test]
  fn totals_and_rate() {
    let records = [record("a", "A", "Music", 1_000, 40, 10), record("b", "B", "Music", 1_000, 50, 0)];
    let s = summarize(&records, 5);
    assert_eq!(s.videos, 2);
    assert_eq!(s.total_views, 2_000);
    assert_eq!(s.total_likes, 90);
    assert_eq!(s.total_comments, 10);
    assert!((s.engagement_rate - 5.0).abs() < 1e-9);
  }

  #[test]
  fn groups_sorted_by_views() {
    let records = [
      record("a", "Small", "Music", 10, 0, 0),
      record("b", "Big", "Gaming", 500, 0, 0),
      record("c", "Small", "Music", 20, 0, 0),
      record("d", "Mid", "Music", 100, 0, 0),
    ];
    let s = summarize(&records, 2);
    let channels: Vec<_> = s.top_channels.iter().map(|g| (g.name.as_str(), g.videos, g.views)).collect();
    assert_eq!(channels, [("Big", 1, 500), ("Mid", 1, 100)]);
    let categories: Vec<_> = s.categories.iter().map(|g| (g.name.as_str(), g.videos)).collect();
    assert_eq!(categories, [("Gaming", 1), ("Music", 3)]);
  }

  #[test]
  fn skips_placeholders_and_duplicates() {
    let mut records = placeholders(4, "Search");
    records.push(record("a", "A", "Music", 100, 1, 1));
    records.push(record("a", "A", "Music", 100, 1, 1));
    let s = summarize(&records, 5);
    assert_eq!(s.videos, 1);
    assert_eq!(s.total_views, 100);
  }

  #[test]
  fn huge_counts_saturate() {
    let records = [record("a", "A", "Music", u64::MAX, u64::MAX, 1), record("b", "A", "Music", 10, 1, 1)];
    let s = summarize(&records, 5);
    assert_eq!(s.total_views, u64::MAX);
    assert_eq!(s.total_likes, u64::MAX);
    assert_eq!(s.total_comments, 2);
    assert_eq!(s.top_channels[0].views, u64::MAX);
    assert!(s.engagement_rate.is_finite());
  }

  #[test]
  fn zero_views_has_zero_rate() {
    let s = summarize(&[record("a", "A", "Music", 0, 3, 3)], 5);
    assert_eq!(s.engagement_rate, 0.0);
  }
}
