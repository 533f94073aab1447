use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph},
};

use tubedash::analytics::GroupTotals;
use tubedash::format::format_compact;
use tubedash::normalize::VideoRecord;

use crate::app::{App, AppMode, Tab};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded_block<'a>(theme: &Theme, title: impl Into<Line<'a>>) -> Block<'a> {
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
}

/// Right-hand metadata for a result row.
fn record_meta(record: &VideoRecord, tab: Tab) -> String {
  let mut parts = Vec::with_capacity(5);
  if tab == Tab::Discover {
    parts.push(record.category.clone());
  }
  parts.push(record.channel_name.clone());
  parts.push(format!("{} views", format_compact(record.view_count)));
  parts.push(record.published.clone());
  parts.push(record.duration.clone());
  parts.join(" · ")
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, chips_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_chips(frame, app, chips_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);

  if app.mode == AppMode::Input && !app.suggestions.is_empty() {
    render_suggestions(frame, app, main_area);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut spans = vec![Span::styled(" ▶ tubedash ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))];
  for (i, tab) in Tab::ALL.iter().enumerate() {
    let style = if *tab == app.tab {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!(" {} {} ", i + 1, tab.label()), style));
  }
  frame.render_widget(Line::from(spans), area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_chips(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let active = app.filters.active_filters();
  if active.is_empty() {
    let hint = Span::styled(" No filters  (f to edit)", Style::default().fg(theme.muted));
    frame.render_widget(Line::from(hint), area);
    return;
  }
  let mut spans = vec![Span::styled(" Filters ", Style::default().fg(theme.muted))];
  for chip in active {
    spans.push(Span::styled(format!(" {} ", chip.label()), Style::default().fg(theme.key_fg).bg(theme.key_bg)));
    spans.push(Span::raw(" "));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if app.mode == AppMode::Panel {
    render_panel(frame, app, area);
    return;
  }
  match app.tab {
    Tab::Analytics => render_analytics(frame, app, area),
    Tab::Discover if app.discover.is_empty() => {
      render_welcome(frame, app.theme(), area, "Loading the discover feed…")
    }
    Tab::Search if app.session.records().is_empty() && !app.session.is_pending() => {
      render_welcome(frame, app.theme(), area, "Type a query below and press Enter.")
    }
    _ => render_results(frame, app, area),
  }
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect, hint: &str) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  Welcome to tubedash", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Discover, search and compare YouTube videos.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled(hint.to_string(), Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  app.viewport_rows = area.height.saturating_sub(2) as usize;

  let records = app.tab_records();
  let selected = app.list_state.selected();
  let items: Vec<ListItem> = app
    .filtered_indices
    .iter()
    .filter_map(|&i| records.get(i).copied())
    .enumerate()
    .map(|(row, record)| {
      let is_selected = Some(row) == selected;
      let fg = if record.placeholder {
        theme.muted
      } else if is_selected {
        theme.highlight_fg
      } else {
        theme.fg
      };
      let bg = if is_selected {
        theme.highlight_bg
      } else if row % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      // Reserve space for right side + 2-char gap
      let right = record_meta(record, app.tab);
      let right_w = right.chars().count().min(inner_w / 2);
      let right = truncate_str(&right, right_w);
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&record.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + right.chars().count());

      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let shown = items.len();
  let title = match app.tab {
    Tab::Search => {
      let label = if app.session.term().is_empty() { "Search Results" } else { app.session.term() };
      let suffix = if app.session.is_pending() {
        " (loading…)"
      } else if app.session.has_more() {
        " (more below)"
      } else {
        ""
      };
      format!(" {} — {} videos{} ", label, shown, suffix)
    }
    tab => format!(" {} — {} videos ", tab.label(), shown),
  };

  let list = List::new(items)
    .block(rounded_block(theme, title))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn group_lines<'a>(theme: &Theme, heading: &'a str, groups: &[GroupTotals]) -> Vec<Line<'a>> {
  let mut lines = vec![Line::from(Span::styled(heading, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))];
  if groups.is_empty() {
    lines.push(Line::from(Span::styled("  nothing loaded yet", Style::default().fg(theme.muted))));
  }
  for g in groups {
    lines.push(Line::from(vec![
      Span::styled(format!("  {:<28}", truncate_str(&g.name, 28)), Style::default().fg(theme.fg)),
      Span::styled(
        format!("{:>4} videos  {:>7} views", g.videos, format_compact(g.views)),
        Style::default().fg(theme.muted),
      ),
    ]));
  }
  lines
}

fn render_analytics(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let summary = app.summary();

  let stat = |label: &'static str, value: String| {
    Line::from(vec![
      Span::styled(format!("  {:<18}", label), Style::default().fg(theme.muted)),
      Span::styled(value, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ])
  };

  let mut lines = vec![
    Line::from(""),
    stat("Videos", summary.videos.to_string()),
    stat("Total views", format_compact(summary.total_views)),
    stat("Total likes", format_compact(summary.total_likes)),
    stat("Total comments", format_compact(summary.total_comments)),
    stat("Engagement rate", format!("{:.2}%", summary.engagement_rate)),
    Line::from(""),
  ];
  lines.extend(group_lines(theme, " Top channels", &summary.top_channels));
  lines.push(Line::from(""));
  lines.extend(group_lines(theme, " Categories", &summary.categories));

  let paragraph = Paragraph::new(lines).block(rounded_block(theme, " Analytics ").padding(Padding::horizontal(1)));
  frame.render_widget(paragraph, area);
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let f = &app.filters;
  let row = |key: &'static str, label: &'static str, value: String| {
    Line::from(vec![
      Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(format!(" {:<14}", label), Style::default().fg(theme.muted)),
      Span::styled(value, Style::default().fg(theme.fg)),
    ])
  };
  let minimum = |n: u64| if n == 0 { "any".to_string() } else { format!("≥ {}", format_compact(n)) };

  let lines = vec![
    Line::from(""),
    row("d", "Upload date", app.date_preset.label().to_string()),
    row("u", "Duration", format!("{} ({})", f.duration.label(), f.duration.bucket().as_param())),
    row("c", "Category", app.category_name().to_string()),
    row("o", "Sort by", f.order.label().to_string()),
    row("r", "Region", f.region_code.clone()),
    row("v", "Min views", minimum(f.min_views)),
    row("l", "Min likes", minimum(f.min_likes)),
    row("m", "Min comments", minimum(f.min_comments)),
    Line::from(""),
    Line::from(Span::styled(
      "  Backspace removes the last filter, x resets all.",
      Style::default().fg(theme.muted),
    )),
  ];
  let paragraph = Paragraph::new(lines).block(rounded_block(theme, " Filters ").padding(Padding::horizontal(1)));
  frame.render_widget(paragraph, area);
}

fn render_suggestions(frame: &mut Frame, app: &App, main_area: Rect) {
  let theme = app.theme();
  let height = (app.suggestions.len() as u16 + 2).min(main_area.height);
  let width = main_area.width.min(60);
  let area = Rect { x: main_area.x + 1, y: main_area.y + main_area.height - height, width, height };

  let items: Vec<ListItem> = app
    .suggestions
    .iter()
    .enumerate()
    .map(|(i, s)| {
      let style = if Some(i) == app.suggestion_index {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg)
      } else {
        Style::default().fg(theme.fg).bg(theme.bg)
      };
      ListItem::new(truncate_str(s, width.saturating_sub(4) as usize)).style(style)
    })
    .collect();

  frame.render_widget(Clear, area);
  frame.render_widget(List::new(items).block(rounded_block(theme, " Suggestions ")), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.muted))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let filtering = app.mode == AppMode::Filter;
  let focused = app.mode == AppMode::Input || filtering;
  let border_color = if focused { theme.accent } else { theme.border };
  let title = if filtering { " Filter results " } else { " Search YouTube " };
  let input_block = Block::bordered()
    .title(title)
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let (text, cursor, scroll) = if filtering {
    (&app.filter, app.filter_cursor, &mut app.filter_scroll)
  } else {
    (&app.input, app.cursor_position, &mut app.input_scroll)
  };

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(text, cursor);

  if cursor_col < *scroll {
    *scroll = cursor_col;
  } else if cursor_col >= *scroll + inner_w {
    *scroll = cursor_col.saturating_sub(inner_w) + 1;
  }
  let offset = *scroll;

  let visible: String = text
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= offset)
    .take_while(|(start, _, _)| *start < offset + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - offset) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Input => {
      let mut k = vec![("Enter", "Search")];
      if !app.suggestions.is_empty() {
        k.push(("Tab", "Suggestion"));
      }
      k.push(("↓", "Results"));
      k.push(("^t", "Theme"));
      k.push(("^c", "Quit"));
      k
    }
    AppMode::Results => {
      let mut k = vec![("1-4", "Tabs"), ("j/k", "Navigate")];
      if app.tab.is_list() {
        k.push(("Enter", "Open"));
        k.push(("/", "Filter"));
      }
      k.push(("f", "Filters"));
      k.push(("s", "Search"));
      k.push(("q", "Quit"));
      k
    }
    AppMode::Filter => vec![("Enter", "Apply"), ("Esc", "Clear"), ("↑/↓", "Navigate")],
    AppMode::Panel => vec![("d/u/c/o/r", "Cycle"), ("v/l/m", "Minimums"), ("x", "Reset"), ("Esc", "Done")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use tubedash::normalize::placeholders;

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("abc", 5), "abc");
    assert_eq!(truncate_str("abcdef", 4), "abc…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("a日b", 3), 4);
    assert_eq!(display_width("a日b", 1), 1);
  }

  #[test]
  fn meta_includes_niche_on_discover() {
    let record = placeholders(1, "Science").remove(0);
    let discover = record_meta(&record, Tab::Discover);
    assert!(discover.starts_with("Science · "));
    let search = record_meta(&record, Tab::Search);
    assert!(search.starts_with(&record.channel_name));
    assert!(search.ends_with(&record.duration));
  }
}
