//! LuckyDraw Engine - Main entry point.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use luckydraw_engine::api::{console, FeedClient};
use luckydraw_engine::app::{App, LoggingObserver};
use luckydraw_engine::infrastructure::clock::{SeededRandom, SystemClock, SystemRandom};
use luckydraw_engine::infrastructure::json_store::JsonFileStore;
use luckydraw_engine::infrastructure::ports::RandomPort;
use luckydraw_engine::infrastructure::settings::EngineSettings;
use luckydraw_engine::use_cases::TracingFrameSink;

/// Log one frame summary per second at the default frame rate.
const FRAME_LOG_EVERY: u64 = 60;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luckydraw_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LuckyDraw Engine");

    let settings = EngineSettings::from_env()?;
    tracing::info!(
        data_path = %settings.data_path.display(),
        feed_url = %settings.feed_url,
        row_count = settings.row_count,
        max_per_draw = settings.max_per_draw,
        "Settings loaded"
    );

    let store = Arc::new(JsonFileStore::new(settings.data_path.clone()));
    let random: Arc<dyn RandomPort> = match settings.rng_seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded randomness");
            Arc::new(SeededRandom::new(seed))
        }
        None => Arc::new(SystemRandom::new()),
    };

    let mut app = App::load(settings.clone(), store, Arc::new(SystemClock::new()), random).await?;
    app.engine_mut().subscribe(LoggingObserver);
    app.engine_mut()
        .attach_sink(TracingFrameSink::new(FRAME_LOG_EVERY));

    let (feed_tx, feed_rx) = mpsc::channel(64);
    let feed = FeedClient::new(settings.feed_url.clone()).spawn(feed_tx);

    let (command_tx, command_rx) = mpsc::channel(16);
    let _console = console::spawn_stdin(command_tx)?;
    tracing::info!("Operator console ready: enter, start, stop, continue, quit, back, esc, prize <id>");

    app.run(feed_rx, command_rx, shutdown_signal()).await?;

    feed.abort();
    tracing::info!("LuckyDraw Engine stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Local overrides win: dotenvy never replaces a variable already set.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
    let _ = dotenvy::dotenv();
}
