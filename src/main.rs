use std::env;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::time::{self, Instant, Interval};

mod config;
mod console;
mod editor;
mod input;
mod logging;
mod render;
mod runner;
mod theme;

use config::{ConfigEngine, Settings};
use editor::Editor;
use render::Renderer;
use theme::Theme;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let log_path = logging::init();
    tracing::info!(log = ?log_path, "batchpad starting");

    let (settings, config_error) = load_settings();
    let theme = theme::get_builtin_theme(&settings.theme);
    let theme_name = settings.theme.clone();

    let mut editor = Editor::new(settings);
    if let Some(path) = env::args().nth(1) {
        editor.edit(&path, false);
    }
    if theme.is_none() {
        editor.warn(format!(
            "Unknown theme '{}' (available: {})",
            theme_name,
            theme::list_builtin_themes().join(", ")
        ));
    }
    if let Some(err) = config_error {
        editor.error(format!("Config error: {}", err));
    }
    let theme = theme.unwrap_or_default();
    tracing::debug!(theme = %theme.name, "theme selected");

    // Set up terminal
    Renderer::setup()?;
    let result = run(&mut editor, &theme).await;
    Renderer::teardown()?;

    tracing::info!("batchpad exiting");
    result
}

fn load_settings() -> (Settings, Option<config::ConfigError>) {
    let mut engine = ConfigEngine::new();
    let error = engine.load_default().err();
    if let Some(err) = &error {
        tracing::warn!(error = %err, "failed to load config");
    }
    (engine.settings(), error)
}

fn autosave_timer(secs: u64) -> Option<Interval> {
    if secs == 0 {
        return None;
    }
    let period = Duration::from_secs(secs);
    Some(time::interval_at(Instant::now() + period, period))
}

/// Resolves on the next autosave tick, never when autosave is disabled
async fn autosave_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run(editor: &mut Editor, theme: &Theme) -> std::io::Result<()> {
    let mut renderer = Renderer::new()?;

    // Initial render
    editor.adjust_scroll(renderer.editor_height(editor));
    renderer.render(editor, theme)?;

    // Event stream for async key reading
    let mut event_stream = EventStream::new();
    let mut autosave = autosave_timer(editor.settings.autosave_secs);

    // Main loop
    while editor.running {
        tokio::select! {
            Some(Ok(event)) = event_stream.next() => {
                if let Event::Resize(width, height) = event {
                    renderer.resize(width, height);
                }
                input::handle_event(editor, event);
            }
            Some(event) = editor.runner.next_event() => {
                editor.apply_run_event(event);
                // Drain whatever else arrived so bursts of output render once
                while let Some(event) = editor.runner.try_next_event() {
                    editor.apply_run_event(event);
                }
            }
            _ = autosave_tick(&mut autosave) => {
                editor.auto_save();
            }
        }
        editor.adjust_scroll(renderer.editor_height(editor));
        renderer.render(editor, theme)?;
    }

    Ok(())
}
