pub mod api;
pub mod app;
pub mod common;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod pages;
pub mod permissions;
pub mod session;
pub mod store;
pub mod tui;
pub mod ui;
pub mod validation;

use anyhow::{Context, Result};
use api::ApiClient;
use app::App;
use config::Config;
use event::EventHandler;
use session::{Session, SessionStorage};
use std::time::Duration;
use store::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e:#}");
        std::process::exit(1);
    });

    logging::init(&config.log_file)?;
    tracing::info!(api = %config.api.base_url, "starting console");

    // Restore any persisted session before the first frame
    let storage = SessionStorage::new(config.session_file.clone());
    let client = ApiClient::new(config.api.clone())
        .context("Failed to create API client")?
        .with_storage(storage.clone());
    let session = Session::initialize(storage, &client);
    let mut app = App::new(AppState::new(session), client, config.download_dir.clone());

    // Setup terminal
    let mut terminal = tui::init()?;
    tui::install_panic_hook();

    let tick_rate = Duration::from_millis(250);
    let mut events = EventHandler::new(tick_rate);

    let res = app.run(&mut terminal, &mut events).await;

    // Restore terminal
    tui::restore()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "console exited with an error");
        println!("{err:?}");
    }

    Ok(())
}
