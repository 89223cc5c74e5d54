//! Person list entry point.

use std::io;

use app::{AppError, Config};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<(), AppError> {
    // 1. Initialize tracing; stdout belongs to the rendering surface
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // 2. Load configuration
    let config = Config::from_env();
    tracing::info!(
        container = %config.view.container_id,
        format = ?config.format,
        seed = config.seed,
        "starting person list"
    );

    // 3. Build the application (renders once on attach)
    let app = app::create_stdout_app(&config);

    // 4. Drive it from stdin until quit or end of input
    app.run(io::stdin().lock(), io::stderr())?;

    tracing::info!(people = app.people().len(), "person list shut down");
    Ok(())
}
