use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub region_code: Option<String>,
  pub api_key: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tubedash") {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file) {
        return Self::parse(&content);
      }
    }
    Self::default()
  }

  /// Parse prefs, falling back to defaults on malformed input.
  pub fn parse(content: &str) -> Self {
    toml::from_str(content).unwrap_or_else(|e| {
      warn!(err = %e, "config: malformed prefs.toml, using defaults");
      Self::default()
    })
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tubedash") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// API key by precedence: command line, environment, prefs file.
  pub fn resolve_api_key(&self, cli: Option<&str>, env: Option<&str>) -> Option<String> {
    [cli, env, self.api_key.as_deref()].into_iter().flatten().map(str::trim).find(|k| !k.is_empty()).map(str::to_string)
  }
}
