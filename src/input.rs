use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode, Tab};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Line-editing keys shared by the search box and the filter box. Returns
/// whether the text changed, or `None` when the key is not an editing key.
fn edit_text(text: &mut String, cursor: &mut usize, code: KeyCode) -> Option<bool> {
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(text, *cursor);
      text.insert(byte_idx, c);
      *cursor += 1;
      Some(true)
    }
    KeyCode::Backspace => {
      if *cursor > 0 {
        *cursor -= 1;
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
        return Some(true);
      }
      Some(false)
    }
    KeyCode::Delete => {
      if *cursor < text.chars().count() {
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
        return Some(true);
      }
      Some(false)
    }
    KeyCode::Left => {
      *cursor = cursor.saturating_sub(1);
      Some(false)
    }
    KeyCode::Right => {
      if *cursor < text.chars().count() {
        *cursor += 1;
      }
      Some(false)
    }
    KeyCode::Home => {
      *cursor = 0;
      Some(false)
    }
    KeyCode::End => {
      *cursor = text.chars().count();
      Some(false)
    }
    _ => None,
  }
}

fn open_in_browser(app: &mut App) {
  let Some(url) = app.selected_record().filter(|r| !r.placeholder).map(|r| r.watch_url()) else { return };
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  match std::process::Command::new(cmd)
    .arg(&url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
  {
    Ok(mut child) => {
      // Reap the child in a background thread to avoid zombie processes.
      std::thread::spawn(move || {
        let _ = child.wait();
      });
      app.info_message = Some(format!("Opened {}", url));
    }
    Err(e) => {
      app.set_error(format!("Failed to open browser: {}", e));
    }
  }
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('o') {
    open_in_browser(app);
    return Ok(());
  }

  match app.mode {
    AppMode::Input => handle_input_key(app, key),
    AppMode::Results => handle_results_key(app, key),
    AppMode::Filter => handle_filter_key(app, key),
    AppMode::Panel => handle_panel_key(app, key),
  }
  Ok(())
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => {
      app.accept_suggestion();
      app.trigger_search();
    }
    KeyCode::Tab => {
      app.cycle_suggestion();
    }
    KeyCode::Esc => {
      if !app.suggestions.is_empty() {
        app.suggestions.clear();
        app.suggestion_index = None;
      } else if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
        app.input_changed();
      } else {
        app.mode = AppMode::Results;
      }
    }
    KeyCode::Down => {
      app.mode = AppMode::Results;
    }
    code => {
      if edit_text(&mut app.input, &mut app.cursor_position, code) == Some(true) {
        app.input_changed();
      }
    }
  }
}

fn handle_results_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter | KeyCode::Char('o') => open_in_browser(app),
    KeyCode::Char('/') if app.tab.is_list() => {
      app.mode = AppMode::Filter;
    }
    KeyCode::Char('f') => {
      app.mode = AppMode::Panel;
    }
    KeyCode::Char('s') | KeyCode::Char('i') => {
      app.mode = AppMode::Input;
    }
    KeyCode::Char('q') => {
      app.should_quit = true;
    }
    KeyCode::Char(c @ '1'..='4') => {
      let idx = c as usize - '1' as usize;
      app.set_tab(Tab::ALL[idx]);
    }
    KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.set_tab(app.tab.next()),
    KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.set_tab(app.tab.prev()),
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
    KeyCode::Esc => {
      app.mode = AppMode::Input;
    }
    _ => {}
  }
}

fn handle_filter_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down => app.select_next(),
    KeyCode::Up => app.select_prev(),
    KeyCode::Enter => {
      // Apply filter and return to Results mode
      app.mode = AppMode::Results;
    }
    KeyCode::Esc => {
      // Clear filter and return to Results mode
      app.filter.clear();
      app.filter_cursor = 0;
      app.filter_scroll = 0;
      app.recompute_filter();
      app.mode = AppMode::Results;
    }
    code => {
      if edit_text(&mut app.filter, &mut app.filter_cursor, code) == Some(true) {
        app.recompute_filter();
      }
    }
  }
}

fn handle_panel_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char('d') => app.cycle_date(),
    KeyCode::Char('u') => app.cycle_duration(),
    KeyCode::Char('c') => app.cycle_category(),
    KeyCode::Char('o') => app.cycle_order(),
    KeyCode::Char('r') => app.cycle_region(),
    KeyCode::Char('v') => app.cycle_min_views(),
    KeyCode::Char('l') => app.cycle_min_likes(),
    KeyCode::Char('m') => app.cycle_min_comments(),
    KeyCode::Backspace => app.remove_last_filter(),
    KeyCode::Char('x') => app.reset_filters(),
    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('f') => {
      app.mode = AppMode::Results;
    }
    _ => {}
  }
}
