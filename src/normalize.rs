use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{avatar_url, constants};
use crate::format::{format_iso_duration, format_relative, parse_published};
use crate::youtube::RawVideo;

/// Fully-populated view of one fetched video. Built only by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
  pub id: String,
  pub title: String,
  pub channel_name: String,
  pub channel_id: String,
  pub channel_avatar: String,
  pub thumbnail_url: String,
  pub view_count: u64,
  pub like_count: u64,
  pub comment_count: u64,
  pub duration: String,
  pub published: String,
  pub category: String,
  pub description: String,
  /// Set on synthetic records served in place of a failed fetch.
  pub placeholder: bool,
}

impl VideoRecord {
  pub fn watch_url(&self) -> String {
    format!("https://youtube.com/watch?v={}", self.id)
  }
}

fn parse_count(raw: Option<&String>) -> u64 {
  raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

fn non_empty(raw: Option<String>) -> Option<String> {
  raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Convert a raw payload into a `VideoRecord`, filling defaults for anything missing:
/// zero counts, placeholder thumbnail, `0:00` duration, `unknown` publish time.
pub fn normalize(raw: RawVideo, category: &str, now: DateTime<Utc>) -> VideoRecord {
  let snippet = raw.snippet.unwrap_or_default();
  let stats = raw.statistics.unwrap_or_default();

  let channel_name = non_empty(snippet.channel_title).unwrap_or_else(|| "Unknown channel".to_string());
  let thumbnail_url = snippet
    .thumbnails
    .and_then(|t| [t.high, t.medium, t.default].into_iter().flatten().map(|t| t.url).find(|u| !u.is_empty()))
    .unwrap_or_else(|| constants().placeholder_thumbnail.clone());
  let duration = raw
    .content_details
    .and_then(|c| c.duration)
    .map(|d| format_iso_duration(&d))
    .unwrap_or_else(|| "0:00".to_string());
  let published = snippet
    .published_at
    .as_deref()
    .and_then(parse_published)
    .map(|ts| format_relative(ts, now))
    .unwrap_or_else(|| "unknown".to_string());

  VideoRecord {
    title: non_empty(snippet.title).unwrap_or_else(|| "Untitled video".to_string()),
    channel_avatar: avatar_url(&channel_name),
    channel_id: snippet.channel_id.unwrap_or_default(),
    channel_name,
    thumbnail_url,
    view_count: parse_count(stats.view_count.as_ref()),
    like_count: parse_count(stats.like_count.as_ref()),
    comment_count: parse_count(stats.comment_count.as_ref()),
    duration,
    published,
    category: category.to_string(),
    description: snippet.description.unwrap_or_default(),
    id: raw.id,
    placeholder: false,
  }
}

const PLACEHOLDER_TITLES: [&str; 12] = [
  "How to Build a Web Application from Scratch",
  "5 Tools Every Content Creator Should Be Using",
  "The Ultimate Guide to Video SEO",
  "Server Components Explained",
  "Building a Modern Web Application Step by Step",
  "Tips and Tricks You Need to Know",
  "Creating Responsive Layouts with CSS Grid",
  "TypeScript for Beginners - Full Course",
  "How to Optimize Your Website for Speed",
  "The Future of Web Development",
  "10 Editor Extensions Every Developer Should Use",
  "Understanding Async/Await",
];

const PLACEHOLDER_CHANNELS: [&str; 9] = [
  "TechTutorials",
  "CodeWithMe",
  "WebDevSimplified",
  "JavaScript Mastery",
  "CSS Tricks",
  "React University",
  "Next.js Official",
  "TypeScript Guru",
  "Frontend Masters",
];

/// A fixed batch of synthetic records shown when the upstream API fails.
/// Output depends only on `count`, `label` and the index, so it is stable across calls.
pub fn placeholders(count: usize, label: &str) -> Vec<VideoRecord> {
  (0..count)
    .map(|i| {
      let channel = PLACEHOLDER_CHANNELS[i % PLACEHOLDER_CHANNELS.len()];
      let n = i as u64;
      VideoRecord {
        id: format!("placeholder-{}", i),
        title: PLACEHOLDER_TITLES[i % PLACEHOLDER_TITLES.len()].to_string(),
        channel_name: channel.to_string(),
        channel_id: format!("channel-{}", i),
        channel_avatar: avatar_url(channel),
        thumbnail_url: format!("{}&random={}", constants().placeholder_thumbnail, i),
        view_count: 50_000 + (n * 79_193) % 950_000,
        like_count: 5_000 + (n * 3_571) % 45_000,
        comment_count: 500 + (n * 277) % 2_500,
        duration: format!("{}:{:02}", 1 + i % 10, 1 + (i * 7) % 59),
        published: format!("{} weeks ago", 1 + i % 4),
        category: label.to_string(),
        description: format!("Placeholder shown because results could not be loaded. Category: {}", label),
        placeholder: true,
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::youtube::{ContentDetails, Snippet, Statistics, Thumbnail, Thumbnails};
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
  }

  fn full_raw() -> RawVideo {
    RawVideo {
      id: "abc".to_string(),
      snippet: Some(Snippet {
        title: Some("Cats being cats".to_string()),
        channel_title: Some("Cat TV".to_string()),
        channel_id: Some("UC123".to_string()),
        description: Some("meow".to_string()),
        published_at: Some("2024-05-18T00:00:00Z".to_string()),
        thumbnails: Some(Thumbnails {
          high: Some(Thumbnail { url: "https://i.ytimg.com/hq.jpg".to_string() }),
          medium: None,
          default: Some(Thumbnail { url: "https://i.ytimg.com/default.jpg".to_string() }),
        }),
      }),
      content_details: Some(ContentDetails { duration: Some("PT3M7S".to_string()) }),
      statistics: Some(Statistics {
        view_count: Some("1234".to_string()),
        like_count: Some("56".to_string()),
        comment_count: Some("7".to_string()),
      }),
    }
  }

  #[test]
  fn normalizes_complete_payload() {
    let record = normalize(full_raw(), "cats", now());
    assert_eq!(record.id, "abc");
    assert_eq!(record.title, "Cats being cats");
    assert_eq!(record.channel_name, "Cat TV");
    assert_eq!(record.channel_id, "UC123");
    assert!(record.channel_avatar.ends_with("seed=Cat%20TV"));
    assert_eq!(record.thumbnail_url, "https://i.ytimg.com/hq.jpg");
    assert_eq!((record.view_count, record.like_count, record.comment_count), (1234, 56, 7));
    assert_eq!(record.duration, "3:07");
    assert_eq!(record.published, "2 weeks ago");
    assert_eq!(record.category, "cats");
    assert!(!record.placeholder);
  }

  #[test]
  fn missing_view_count_is_zero() {
    let mut raw = full_raw();
    raw.statistics = Some(Statistics { view_count: None, ..raw.statistics.clone().unwrap() });
    let record = normalize(raw, "cats", now());
    assert_eq!(record.view_count, 0);
    assert_eq!(record.like_count, 56);
  }

  #[test]
  fn garbage_counts_are_zero() {
    let mut raw = full_raw();
    raw.statistics = Some(Statistics { view_count: Some("lots".to_string()), like_count: None, comment_count: None });
    let record = normalize(raw, "cats", now());
    assert_eq!((record.view_count, record.like_count, record.comment_count), (0, 0, 0));
  }

  #[test]
  fn bare_payload_gets_defaults() {
    let record = normalize(RawVideo { id: "x".to_string(), ..RawVideo::default() }, "Trending", now());
    assert_eq!(record.id, "x");
    assert_eq!(record.title, "Untitled video");
    assert_eq!(record.channel_name, "Unknown channel");
    assert_eq!(record.thumbnail_url, constants().placeholder_thumbnail);
    assert_eq!((record.view_count, record.like_count, record.comment_count), (0, 0, 0));
    assert_eq!(record.duration, "0:00");
    assert_eq!(record.published, "unknown");
    assert_eq!(record.description, "");
  }

  #[test]
  fn falls_back_to_default_thumbnail_size() {
    let mut raw = full_raw();
    if let Some(snippet) = raw.snippet.as_mut() {
      snippet.thumbnails = Some(Thumbnails {
        high: Some(Thumbnail { url: String::new() }),
        medium: None,
        default: Some(Thumbnail { url: "https://i.ytimg.com/default.jpg".to_string() }),
      });
    }
    assert_eq!(normalize(raw, "cats", now()).thumbnail_url, "https://i.ytimg.com/default.jpg");
  }

  #[test]
  fn placeholders_are_stable_and_labelled() {
    let a = placeholders(12, "cats");
    let b = placeholders(12, "cats");
    assert_eq!(a.len(), 12);
    assert_eq!(a, b);
    assert!(a.iter().all(|r| r.placeholder && r.category == "cats"));
    assert_eq!(a[0].id, "placeholder-0");
    assert_eq!(a[11].id, "placeholder-11");
  }

  #[test]
  fn serializes_camel_case() {
    let json = serde_json::to_value(normalize(full_raw(), "cats", now())).unwrap();
    assert_eq!(json["viewCount"], 1234);
    assert_eq!(json["channelName"], "Cat TV");
  }
}
