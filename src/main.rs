use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use campaign_hub::config::Config;
use campaign_hub::smtp::SmtpMailer;
use campaign_hub::{db, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,campaign_hub=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("database ready at {}", config.database_url);

    let mailer = SmtpMailer::from_config(&config.smtp)?;
    let state = AppState {
        pool,
        transport: Arc::new(mailer),
    };

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
