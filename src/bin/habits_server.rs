//! HTTP API binary for habit tracking.
//!
//! Serves the JSON API on the configured `listen_addr`.

use habit_tracker::api;
use habit_tracker::config::AppConfig;
use habit_tracker::logging::{self, LogTarget};
use habit_tracker::service::HabitService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LogTarget::Stderr)?;
    logging::install_panic_hook();

    let config = AppConfig::load()?;
    let addr = config.listen_addr()?;
    let service = HabitService::open(config)?;

    api::serve(service, addr).await?;
    Ok(())
}
