mod app;
mod config;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use tubedash::error::FetchError;
use tubedash::filters::FilterState;
use tubedash::service::Dashboard;
use tubedash::youtube::{VideoApi, YouTubeClient};

use app::App;
use config::{API_KEY_ENV, Config};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Two-letter region code for trending, categories and search (default: prefs, then US)
  #[arg(short, long)]
  region: Option<String>,

  /// YouTube Data API key (default: $YOUTUBE_API_KEY, then prefs)
  #[arg(long)]
  api_key: Option<String>,

  /// Run this search on startup
  #[arg(short, long)]
  query: Option<String>,

  /// Search without the TUI and print results as JSON lines
  #[arg(short, long, value_name = "QUERY")]
  print: Option<String>,

  /// Number of pages to fetch with --print
  #[arg(long, default_value_t = 1, requires = "print")]
  pages: u32,

  /// Print a shell completion script and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), env!("CARGO_PKG_NAME"), &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = logging::init_logging().context("Failed to initialize logging")?;

  let config = Config::load();
  let env_key = std::env::var(API_KEY_ENV).ok();
  let api_key = config.resolve_api_key(args.api_key.as_deref(), env_key.as_deref());
  let region = args
    .region
    .clone()
    .or_else(|| config.region_code.clone())
    .unwrap_or_else(|| tubedash::constants::constants().default_region.clone())
    .to_uppercase();

  if let Some(query) = args.print.as_deref() {
    let Some(key) = api_key else {
      bail!("no API key: pass --api-key or set {}", API_KEY_ENV);
    };
    let api: Arc<dyn VideoApi> = Arc::new(YouTubeClient::new(key).context("Failed to build HTTP client")?);
    return print_search(api, query, &region, args.pages).await;
  }

  if api_key.is_none() {
    warn!("no API key configured, requests will fail and placeholders will be shown");
  }
  let api: Arc<dyn VideoApi> =
    Arc::new(YouTubeClient::new(api_key.unwrap_or_default()).context("Failed to build HTTP client")?);

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  info!(region = %region, "tubedash starting");
  let mut terminal = ratatui::init();
  let result = run(&mut terminal, api, &config, &region, args.query.as_deref()).await;
  ratatui::restore();
  result
}

/// Headless mode: one search, optionally paged, as JSON lines on stdout.
async fn print_search(api: Arc<dyn VideoApi>, query: &str, region: &str, pages: u32) -> Result<()> {
  let filters = FilterState::with_region(region);
  let mut dashboard = Dashboard::new(api, filters.clone());
  let mut stdout = std::io::stdout().lock();

  let first = dashboard.search(query, filters).await;
  for record in &first.records {
    writeln!(stdout, "{}", serde_json::to_string(record)?)?;
  }

  for _ in 1..pages.max(1) {
    let view = match dashboard.load_more().await {
      Ok(view) => view,
      Err(FetchError::NoMoreResults) => break,
      Err(e) => return Err(e).context("Failed to load the next page"),
    };
    for record in &view.records {
      writeln!(stdout, "{}", serde_json::to_string(record)?)?;
    }
  }
  stdout.flush()?;
  Ok(())
}

async fn run(
  terminal: &mut DefaultTerminal,
  api: Arc<dyn VideoApi>,
  config: &Config,
  region: &str,
  initial_query: Option<&str>,
) -> Result<()> {
  let mut app = App::new(api, config, region);
  app.start(initial_query);

  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    app.tick();

    if event::poll(Duration::from_millis(50))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key)?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("tubedash exiting");
  Ok(())
}
