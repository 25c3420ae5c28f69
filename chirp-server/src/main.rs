use anyhow::Result;
use tracing::warn;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use infrastructure::logging::init_logging;
use infrastructure::password::PasswordHasher;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;
    if settings.is_development() {
        warn!("development environment: 500 responses include error details");
    }

    let state = AppState::in_memory(
        PasswordHasher::default(),
        &settings.admin_password,
        &settings.environment,
    );

    server::run_http(&settings, state).await
}
