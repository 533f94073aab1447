use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Midnight",
    bg: Color::Rgb(17, 19, 28),
    fg: Color::Rgb(220, 223, 235),
    accent: Color::Rgb(239, 68, 68),
    muted: Color::Rgb(118, 124, 146),
    border: Color::Rgb(52, 57, 78),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(60, 36, 48),
    stripe_bg: Color::Rgb(22, 25, 36),
    status: Color::Rgb(250, 204, 21),
    error: Color::Rgb(248, 113, 113),
    key_fg: Color::Rgb(17, 19, 28),
    key_bg: Color::Rgb(118, 124, 146),
  },
  Theme {
    name: "Daylight",
    bg: Color::Rgb(250, 250, 247),
    fg: Color::Rgb(38, 38, 46),
    accent: Color::Rgb(200, 30, 30),
    muted: Color::Rgb(120, 120, 130),
    border: Color::Rgb(208, 208, 214),
    highlight_fg: Color::Rgb(20, 20, 24),
    highlight_bg: Color::Rgb(254, 226, 226),
    stripe_bg: Color::Rgb(243, 243, 240),
    status: Color::Rgb(180, 120, 0),
    error: Color::Rgb(190, 18, 60),
    key_fg: Color::Rgb(250, 250, 247),
    key_bg: Color::Rgb(120, 120, 130),
  },
  Theme {
    name: "Dusk",
    bg: Color::Rgb(30, 27, 46),
    fg: Color::Rgb(226, 218, 245),
    accent: Color::Rgb(244, 143, 177),
    muted: Color::Rgb(140, 130, 170),
    border: Color::Rgb(70, 62, 100),
    highlight_fg: Color::Rgb(30, 27, 46),
    highlight_bg: Color::Rgb(244, 143, 177),
    stripe_bg: Color::Rgb(36, 32, 54),
    status: Color::Rgb(167, 243, 208),
    error: Color::Rgb(252, 165, 165),
    key_fg: Color::Rgb(30, 27, 46),
    key_bg: Color::Rgb(140, 130, 170),
  },
];

/// Index of the theme called `name`, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}
